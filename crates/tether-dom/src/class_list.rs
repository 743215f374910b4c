//! Class-name string manipulation.
//!
//! Class names are whitespace-separated tokens. These helpers work on the
//! raw string so they behave the same for every element kind.

/// Split a class string into its tokens.
pub fn tokens(class_name: &str) -> impl Iterator<Item = &str> {
    class_name.split_whitespace()
}

/// Check whether `class_name` contains the whole token `class`.
pub fn contains(class_name: &str, class: &str) -> bool {
    let class = class.trim();
    !class.is_empty() && tokens(class_name).any(|token| token == class)
}

/// Add every token of `classes` that is not already present.
pub fn add(class_name: &str, classes: &str) -> String {
    let mut current: Vec<&str> = tokens(class_name).collect();
    for class in tokens(classes) {
        if !current.contains(&class) {
            current.push(class);
        }
    }
    current.join(" ")
}

/// Remove the first occurrence of every token of `classes`.
pub fn remove(class_name: &str, classes: &str) -> String {
    let mut current: Vec<&str> = tokens(class_name).collect();
    for class in tokens(classes) {
        if let Some(index) = current.iter().position(|&c| c == class) {
            current.remove(index);
        }
    }
    current.join(" ")
}
