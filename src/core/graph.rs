//! # Start-order resolution (Kahn's algorithm).
//!
//! ```text
//! pending[m]    = |m.requires()|                (dependencies not started yet)
//! dependents[d] = [m | d ∈ m.requires()]        (reverse edges)
//!
//! ready ← { m | pending[m] == 0 }
//! while m ← ready.pop_front():
//!     order.push(m)
//!     for x in dependents[m]: pending[x] -= 1; if pending[x] == 0 { ready.push_back(x) }
//!
//! leftover = { m | pending[m] > 0 }   → cycle or unknown dependency
//! ```
//!
//! ## Rules
//! - every module appears after all modules it requires
//! - order among modules that become ready together is unspecified
//! - a dependency on an unregistered name can never be satisfied
//! - a duplicated dependency entry counts twice and is released twice

use std::collections::{HashMap, VecDeque};

use crate::error::RuntimeError;

/// Computes a start order from `(name, requires)` pairs.
///
/// On failure returns [`RuntimeError::UnresolvedDependencies`] with exactly the
/// modules whose dependency count never reached zero, sorted by name.
pub(crate) fn resolve_order<'a, I>(modules: I) -> Result<Vec<String>, RuntimeError>
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let mut pending: HashMap<&'a str, usize> = HashMap::new();
    let mut dependents: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
    let mut ready: VecDeque<&'a str> = VecDeque::new();

    for (name, requires) in modules {
        pending.insert(name, requires.len());
        if requires.is_empty() {
            ready.push_back(name);
        }
        for dep in requires {
            dependents.entry(dep.as_str()).or_default().push(name);
        }
    }

    let mut order = Vec::with_capacity(pending.len());
    while let Some(name) = ready.pop_front() {
        order.push(name.to_string());

        let Some(waiting) = dependents.get(name) else {
            continue;
        };
        for &dependent in waiting {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.push_back(dependent);
                }
            }
        }
    }

    let mut leftover: Vec<String> = pending
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(name, _)| name.to_string())
        .collect();
    if leftover.is_empty() {
        Ok(order)
    } else {
        leftover.sort_unstable();
        Err(RuntimeError::UnresolvedDependencies { modules: leftover })
    }
}
