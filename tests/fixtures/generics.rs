use std::collections::HashMap;

/// Counts words, ignoring case.
fn count<'a>(words: &[&'a str]) -> HashMap<&'a str, usize> {
	let mut map = HashMap::new();
	for w in words {
		*map.entry(*w).or_insert(0) += 1;
	}
	map
}

fn main() {
    let shifted = 1 << 4 > 2 && true;
    println!("{:?} {}", count(&["a", "b", "a"]), shifted);
}
