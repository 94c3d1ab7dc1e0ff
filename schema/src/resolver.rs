//! Dependency ordering over the reference graph of a schema.

use crate::{error::SchemaError, types::TypeDef};
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Orders `defs` so that every type comes after the types it references.
///
/// Returns indexes into `defs`. Ties keep declaration order. References that
/// are missing from `index` are skipped; reporting them is the caller's job.
/// Fails with [`SchemaError::Cyclic`] naming the first cycle found.
pub fn resolve(
    defs: &[TypeDef],
    index: &HashMap<String, usize>,
) -> Result<Vec<usize>, SchemaError> {
    let mut marks = vec![Mark::Unvisited; defs.len()];
    let mut stack = Vec::new();
    let mut order = Vec::with_capacity(defs.len());

    fn visit(
        at: usize,
        defs: &[TypeDef],
        index: &HashMap<String, usize>,
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> Result<(), SchemaError> {
        match marks[at] {
            Mark::Done => return Ok(()),
            Mark::Visiting => {
                let start = stack.iter().position(|&i| i == at).unwrap_or(0);
                let mut cycle: Vec<String> =
                    stack[start..].iter().map(|&i| defs[i].name().to_string()).collect();
                cycle.push(defs[at].name().to_string());
                return Err(SchemaError::Cyclic { cycle });
            }
            Mark::Unvisited => {}
        }

        marks[at] = Mark::Visiting;
        stack.push(at);
        for name in defs[at].references() {
            if let Some(&next) = index.get(name) {
                visit(next, defs, index, marks, stack, order)?;
            }
        }
        stack.pop();
        marks[at] = Mark::Done;
        order.push(at);
        Ok(())
    }

    for at in 0..defs.len() {
        visit(at, defs, index, &mut marks, &mut stack, &mut order)?;
    }

    Ok(order)
}
