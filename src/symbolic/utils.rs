// the collection of utility functions mainly for bracket parsing and proceeding

/// byte position of the bracket closing the one opened at `bracket_start`
pub fn find_pair_to_this_bracket(input: &str, bracket_start: usize) -> Option<usize> {
    let mut stack = 0usize;
    for (i, c) in input.char_indices().skip_while(|(i, _)| *i < bracket_start) {
        if c == '(' {
            stack += 1;
        } else if c == ')' {
            stack = stack.checked_sub(1)?;
            if stack == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// true if every opening bracket is closed and no closing bracket comes first
pub fn has_balanced_brackets(s: &str) -> bool {
    let mut depth = 0i64;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// "(a+b)" -> true, "(a)+(b)" -> false
pub fn is_wrapped_in_brackets(s: &str) -> bool {
    s.starts_with('(') && find_pair_to_this_bracket(s, 0) == Some(s.len() - 1)
}

/// char that may end an operand, so that a following '+' or '-' is binary
fn ends_operand(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == ')'
}

/// '-' in "2.5e-3" belongs to the literal, '-' in "x2e-3" does not
fn is_exponent_sign(input: &str, sign_pos: usize) -> bool {
    let before = &input[..sign_pos];
    if !(before.ends_with('e') || before.ends_with('E')) {
        return false;
    }
    let token_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '.' || *c == '_')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(sign_pos);
    before[token_start..]
        .chars()
        .next()
        .map(|c| c.is_ascii_digit() || c == '.')
        .unwrap_or(false)
}

/// true if the operator at `pos` joins two operands (not a sign)
fn is_binary_at(input: &str, pos: usize, op: char) -> bool {
    if op != '+' && op != '-' {
        return true;
    }
    let previous = input[..pos].chars().rev().find(|c| !c.is_whitespace());
    match previous {
        Some(p) if ends_operand(p) => !is_exponent_sign(input, pos),
        _ => false,
    }
}

/// Finds an operator outside brackets. With `rightmost` the last match is returned, which makes
/// left-associative splitting possible; otherwise the first one.
pub fn find_operator_outside_brackets(
    input: &str,
    operators: &[char],
    rightmost: bool,
) -> Option<(usize, char)> {
    let mut depth = 0i64;
    let mut found = None;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && operators.contains(&c) && is_binary_at(input, i, c) => {
                found = Some((i, c));
                if !rightmost {
                    return found;
                }
            }
            _ => {}
        }
    }
    found
}

/// Splits at every `separator` outside brackets: "x, (a,b)" -> ["x", "(a,b)"]
pub fn split_top_level(input: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i64;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if c == separator && depth == 0 => {
                parts.push(input[start..i].trim().to_string());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim().to_string());
    parts
}

/// Splits a sum into its additive terms with their signs:
/// "2*a - b^2 + 3" -> [('+', "2*a"), ('-', "b^2"), ('+', "3")]
pub fn split_additive_terms(input: &str) -> Vec<(char, String)> {
    let input = input.trim();
    let mut terms = Vec::new();
    let mut depth = 0i64;
    let mut sign = '+';
    let mut start = 0;
    if let Some(leading @ ('+' | '-')) = input.chars().next() {
        sign = leading;
        start = 1;
    }
    for (i, c) in input.char_indices().skip(start) {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '+' | '-' if depth == 0 && is_binary_at(input, i, c) => {
                terms.push((sign, input[start..i].trim().to_string()));
                sign = c;
                start = i + 1;
            }
            _ => {}
        }
    }
    terms.push((sign, input[start..].trim().to_string()));
    terms.retain(|(_, term)| !term.is_empty());
    terms
}

pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    if num_values < 2 {
        return vec![start; num_values];
    }
    let step = (end - start) / (num_values as f64 - 1.0);
    (0..num_values)
        .map(|i| {
            if i + 1 == num_values {
                end
            } else {
                start + i as f64 * step
            }
        })
        .collect()
}
