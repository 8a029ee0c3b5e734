use std::ops::Index;

use crate::{
    def::{ParamDefinition, Value},
    error::{Error, Result},
};

/// Positional arguments bound to a command's parameter definitions,
/// indexable by zero-based position and, for declared parameters, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentList {
    values: Vec<Value>,
    names: Vec<String>,
}

impl ArgumentList {
    /// Binds raw positional tokens to parameter definitions.
    ///
    /// With no declared parameters (and no explicit "no parameters" mode)
    /// the tokens pass through untransformed, indexable by position only.
    /// Otherwise the token count must match the parameter count exactly;
    /// each token runs through its parameter's transform (if any) and is
    /// stored under both its index and its name.
    pub fn bind(raw: Vec<String>, explicitly_no_params: bool, params: &[ParamDefinition]) -> Result<ArgumentList> {
        if !explicitly_no_params && params.is_empty() {
            let values = raw.into_iter().map(Value::Str).collect();
            return Ok(ArgumentList { values, names: Vec::new() });
        }

        if raw.len() != params.len() {
            return Err(Error::ArgumentCountMismatch { expected: params.len(), actual: raw.len() });
        }

        let mut values = Vec::with_capacity(raw.len());
        for (token, param) in raw.into_iter().zip(params) {
            let value = match param.transform_fn() {
                Some(f) => f(&token).map_err(|_| Error::IllegalParamValue {
                    param: param.name().to_string(),
                    value: token.clone(),
                })?,
                None => Value::Str(token),
            };
            values.push(value);
        }
        let names = params.iter().map(|p| p.name().to_string()).collect();
        Ok(ArgumentList { values, names })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Lookup by parameter name. Always absent for pass-through lists.
    pub fn by_name(&self, name: &str) -> Option<&Value> {
        let index = self.names.iter().position(|n| n == name)?;
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.values.clone()
    }
}

impl Index<usize> for ArgumentList {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl Index<&str> for ArgumentList {
    type Output = Value;

    /// # Panics
    ///
    /// Indexing by an undeclared name is a programming error, not a data
    /// error, and panics.
    fn index(&self, name: &str) -> &Value {
        match self.by_name(name) {
            Some(value) => value,
            None => panic!("no parameter named {name:?}"),
        }
    }
}

impl<'a> IntoIterator for &'a ArgumentList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
