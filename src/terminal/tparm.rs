//! Terminfo parameter expansion
//!
//! Supports the subset of the `tparm` stack language that cursor movement
//! and color capabilities use in practice:
//!
//! | Code | Meaning |
//! |---|---|
//! | `%%` | literal `%` |
//! | `%i` | add 1 to the first two parameters |
//! | `%p1`..`%p9` | push parameter |
//! | `%d`, `%c` | pop and print as decimal / as a character |
//! | `%{n}`, `%'c'` | push an integer / character constant |
//! | `%+ %- %* %/ %m` | arithmetic |
//! | `%= %< %>` | comparison |
//! | `%? %t %e %;` | conditionals |

use crate::error::{Error, Result};

/// Expand `cap` with up to nine integer parameters
pub fn tparm(cap: &str, params: &[i32]) -> Result<String> {
    let code: Vec<char> = cap.chars().collect();
    let mut args = [0i32; 9];
    for (slot, value) in args.iter_mut().zip(params) {
        *slot = *value;
    }

    let mut out = String::with_capacity(cap.len() + 8);
    let mut stack: Vec<i32> = Vec::new();
    let mut i = 0;

    while i < code.len() {
        let c = code[i];
        i += 1;
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&op) = code.get(i) else {
            return Err(malformed(cap, "dangling `%`"));
        };
        i += 1;
        match op {
            '%' => out.push('%'),
            'i' => {
                args[0] += 1;
                args[1] += 1;
            }
            'p' => {
                let digit = code
                    .get(i)
                    .and_then(|d| d.to_digit(10))
                    .filter(|d| (1..=9).contains(d))
                    .ok_or_else(|| malformed(cap, "`%p` needs a digit 1-9"))?;
                i += 1;
                stack.push(args[digit as usize - 1]);
            }
            'd' => out.push_str(&pop(&mut stack).to_string()),
            'c' => {
                let v = pop(&mut stack);
                out.push(char::from_u32(v as u32).unwrap_or('\u{fffd}'));
            }
            '{' => {
                let end = code[i..]
                    .iter()
                    .position(|&ch| ch == '}')
                    .ok_or_else(|| malformed(cap, "unterminated `%{`"))?;
                let literal: String = code[i..i + end].iter().collect();
                let value = literal
                    .parse::<i32>()
                    .map_err(|_| malformed(cap, "bad integer constant"))?;
                stack.push(value);
                i += end + 1;
            }
            '\'' => {
                let ch = *code
                    .get(i)
                    .ok_or_else(|| malformed(cap, "unterminated `%'`"))?;
                if code.get(i + 1) != Some(&'\'') {
                    return Err(malformed(cap, "unterminated `%'`"));
                }
                stack.push(ch as i32);
                i += 2;
            }
            '+' | '-' | '*' | '/' | 'm' | '=' | '<' | '>' => {
                let b = pop(&mut stack);
                let a = pop(&mut stack);
                stack.push(match op {
                    '+' => a.wrapping_add(b),
                    '-' => a.wrapping_sub(b),
                    '*' => a.wrapping_mul(b),
                    '/' => a.checked_div(b).unwrap_or(0),
                    'm' => a.checked_rem(b).unwrap_or(0),
                    '=' => (a == b) as i32,
                    '<' => (a < b) as i32,
                    _ => (a > b) as i32,
                });
            }
            '?' | ';' => {}
            't' => {
                if pop(&mut stack) == 0 {
                    i = skip_branch(&code, i, true);
                }
            }
            // Reached the end of a taken `then` branch
            'e' => i = skip_branch(&code, i, false),
            other => {
                return Err(Error::CapabilityFailure(format!(
                    "unsupported parameter code `%{other}` in {cap:?}"
                )))
            }
        }
    }
    Ok(out)
}

/// Missing operands read as zero, as in terminfo
fn pop(stack: &mut Vec<i32>) -> i32 {
    stack.pop().unwrap_or(0)
}

/// Skip forward to just after the `%e` (if `stop_at_else`) or `%;` that
/// closes the current conditional level
fn skip_branch(code: &[char], mut i: usize, stop_at_else: bool) -> usize {
    let mut depth = 0;
    while i + 1 < code.len() + 1 && i < code.len() {
        if code[i] != '%' {
            i += 1;
            continue;
        }
        let Some(&op) = code.get(i + 1) else {
            return code.len();
        };
        i += 2;
        match op {
            '?' => depth += 1,
            ';' if depth == 0 => return i,
            ';' => depth -= 1,
            'e' if depth == 0 && stop_at_else => return i,
            _ => {}
        }
    }
    code.len()
}

fn malformed(cap: &str, why: &str) -> Error {
    Error::CapabilityFailure(format!("malformed capability {cap:?}: {why}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const XTERM_SETAF: &str =
        "\x1b[%?%p1%{8}%<%t3%p1%d%e%p1%{16}%<%t9%p1%{8}%-%d%e38;5;%p1%d%;m";

    #[test]
    fn test_cursor_address() {
        assert_eq!(tparm("\x1b[%i%p1%d;%p2%dH", &[4, 9]).unwrap(), "\x1b[5;10H");
    }

    #[test]
    fn test_nested_conditionals() {
        assert_eq!(tparm(XTERM_SETAF, &[1]).unwrap(), "\x1b[31m");
        assert_eq!(tparm(XTERM_SETAF, &[9]).unwrap(), "\x1b[91m");
        assert_eq!(tparm(XTERM_SETAF, &[202]).unwrap(), "\x1b[38;5;202m");
    }

    #[test]
    fn test_literals_and_arithmetic() {
        assert_eq!(tparm("%{6}%{7}%*%d", &[]).unwrap(), "42");
        assert_eq!(tparm("%'A'%c%%", &[]).unwrap(), "A%");
        assert_eq!(tparm("%p1%{0}%/%d", &[5]).unwrap(), "0");
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(tparm("%p", &[]), Err(Error::CapabilityFailure(_))));
        assert!(tparm("%{12", &[]).is_err());
        assert!(tparm("%x", &[]).is_err());
        assert!(tparm("abc%", &[]).is_err());
    }
}
