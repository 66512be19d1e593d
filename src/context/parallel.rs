//! Fan-out helpers on the rayon pool.
//!
//! Each item runs inside its own activated snapshot, so every worker starts
//! from an empty trace and leaves the pool thread exactly as it found it.

use rayon::prelude::*;

use super::NarrativeContext;
use crate::tree::TraceTree;

/// Run `task` for every item on the rayon pool and return each result with
/// the trace recorded while producing it, in input order.
///
/// The tree is captured just before the item's scope closes. Calls that are
/// still open on the calling thread are not visible to the workers.
///
/// ```
/// use narrativetrace::context::{parallel, NarrativeContext, ThreadLocalContext};
/// use narrativetrace::event::MethodSignature;
///
/// let context = ThreadLocalContext::new();
/// let results = parallel::par_trace(&context, vec![1, 2, 3], |n| {
///     context.enter_method(
///         MethodSignature::new("Worker", "square").with_param("n", n.to_string()),
///     );
///     context.exit_method_with_return(Some((n * n).to_string()));
///     n * n
/// });
///
/// let squares: Vec<_> = results.iter().map(|(value, _)| *value).collect();
/// assert_eq!(squares, vec![1, 4, 9]);
/// assert!(results.iter().all(|(_, tree)| tree.roots().len() == 1));
/// ```
pub fn par_trace<C, I, R, F>(context: &C, items: I, task: F) -> Vec<(R, TraceTree)>
where
    C: NarrativeContext + ?Sized,
    I: IntoParallelIterator,
    R: Send,
    F: Fn(I::Item) -> R + Send + Sync,
{
    let snapshot = context.snapshot();
    items
        .into_par_iter()
        .map(|item| {
            let scope = snapshot.activate();
            let result = task(item);
            let tree = context.capture_trace();
            scope.close();
            (result, tree)
        })
        .collect()
}
