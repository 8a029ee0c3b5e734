mod args;
mod tree;

fn toks(s: &str) -> Vec<String> {
    s.split_ascii_whitespace().map(String::from).collect()
}
