//! Structural validation of a workflow's step graph.
//!
//! Rules enforced, in order:
//! 1. There is at least one step.
//! 2. Step ids are unique.
//! 3. Every dependency names an existing step.
//! 4. The dependency graph (step → its dependencies) is acyclic.

use std::collections::{HashMap, HashSet};

use crate::error::WorkflowError;

use super::WorkflowStep;

/// Validate a list of steps.
///
/// # Errors
/// - [`WorkflowError::NoSteps`] if `steps` is empty.
/// - [`WorkflowError::DuplicateStepIds`] listing every id seen more than once.
/// - [`WorkflowError::MissingDependency`] for the first dangling reference.
/// - [`WorkflowError::CircularDependency`] naming the step that closes a cycle.
pub fn validate_steps(steps: &[WorkflowStep]) -> Result<(), WorkflowError> {
    if steps.is_empty() {
        return Err(WorkflowError::NoSteps);
    }

    let mut known: HashSet<&str> = HashSet::with_capacity(steps.len());
    let mut duplicates: Vec<String> = Vec::new();
    for step in steps {
        if !known.insert(step.id.as_str()) && !duplicates.contains(&step.id) {
            duplicates.push(step.id.clone());
        }
    }
    if !duplicates.is_empty() {
        return Err(WorkflowError::DuplicateStepIds(duplicates));
    }

    for step in steps {
        if let Some(missing) = step
            .dependencies
            .iter()
            .find(|dep| !known.contains(dep.as_str()))
        {
            return Err(WorkflowError::MissingDependency {
                step: step.id.clone(),
                dependency: missing.clone(),
            });
        }
    }

    let graph: HashMap<&str, &[String]> = steps
        .iter()
        .map(|step| (step.id.as_str(), step.dependencies.as_slice()))
        .collect();
    let mut visiting: HashSet<&str> = HashSet::new();
    let mut visited: HashSet<&str> = HashSet::new();
    for step in steps {
        if !visited.contains(step.id.as_str()) {
            visit(step.id.as_str(), &graph, &mut visiting, &mut visited)?;
        }
    }

    Ok(())
}

fn visit<'a>(
    id: &'a str,
    graph: &HashMap<&'a str, &'a [String]>,
    visiting: &mut HashSet<&'a str>,
    visited: &mut HashSet<&'a str>,
) -> Result<(), WorkflowError> {
    if visiting.contains(id) {
        return Err(WorkflowError::CircularDependency {
            step: id.to_string(),
        });
    }
    if visited.contains(id) {
        return Ok(());
    }

    visiting.insert(id);
    if let Some(dependencies) = graph.get(id) {
        for dependency in *dependencies {
            visit(dependency.as_str(), graph, visiting, visited)?;
        }
    }
    visiting.remove(id);
    visited.insert(id);
    Ok(())
}
