use indexmap::IndexMap;

pub const UNTITLED_PREFIX: &str = "Untitled-";

/// First free `Untitled-<n>` name, starting from one past the current count.
pub fn untitled_name<V>(files: &IndexMap<String, V>) -> String {
    let mut n = files.len() + 1;
    loop {
        let name = format!("{}{}", UNTITLED_PREFIX, n);
        if !files.contains_key(&name) {
            return name;
        }
        n += 1;
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
