//! Evaluation of resolved trees against an environment.
//!
//! Evaluation walks the tree once, threading the current path:
//! - a **leaf** looks up its raw inputs at the current path and hands them to
//!   its field; failures are tagged with that path. Constant leaves skip the
//!   lookup
//! - a **combine** evaluates both sides and merges them applicatively, so a
//!   failing side never hides the other side's errors
//! - a **transform** runs its function only on success and tags the
//!   function's failure with the current path
//! - a **named** node extends the path for everything below it
//!
//! Every raw input seen is echoed back with its path.

use futures::future::{join, BoxFuture, FutureExt};
use tracing::{debug, trace};

use crate::env::Environment;
use crate::field::Method;
use crate::outcome::Outcome;
use crate::path::{Echo, Errors, Path, PathError};
use crate::tree::{take, Node, Rule, Value};

type Evaluated<E> = (Outcome<Errors<E>, Value>, Echo);

impl<E, A> Rule<E, A>
where
    E: Send + 'static,
    A: Send + 'static,
{
    /// Evaluate this rule against `env`.
    ///
    /// Returns the outcome, carrying every path-tagged error on failure, and
    /// the echo of every raw input consulted, in tree order.
    pub async fn eval(&self, method: Method, env: &dyn Environment) -> (Outcome<Errors<E>, A>, Echo) {
        self.eval_at(Path::root(), method, env).await
    }

    /// Evaluate as if this rule sat at `path` in a larger tree.
    pub async fn eval_at(
        &self,
        path: Path,
        method: Method,
        env: &dyn Environment,
    ) -> (Outcome<Errors<E>, A>, Echo) {
        debug!(path = %path, method = ?method, "Evaluating rule");
        let (outcome, echo) = eval_node(&self.node, path, method, env).await;
        (outcome.map(take::<A>), echo)
    }

    /// Evaluate and keep only the outcome, as a `Result`.
    pub async fn run(&self, method: Method, env: &dyn Environment) -> Result<A, Errors<E>> {
        self.eval(method, env).await.0.into_result()
    }
}

fn eval_node<'a, E: Send + 'static>(
    node: &'a Node<E>,
    path: Path,
    method: Method,
    env: &'a dyn Environment,
) -> BoxFuture<'a, Evaluated<E>> {
    async move {
        match node {
            Node::Leaf(field) => {
                let inputs = if field.reads_input() {
                    env.lookup(&path).await
                } else {
                    Vec::new()
                };
                trace!(path = %path, inputs = inputs.len(), "Evaluating field");
                let outcome = field
                    .evaluate(method, &inputs)
                    .map_err(|error| vec![PathError::new(path.clone(), error)]);
                let echo = inputs
                    .into_iter()
                    .map(|input| (path.clone(), input))
                    .collect();
                (outcome, echo)
            }
            Node::Combine { fun, arg, apply } => {
                let ((fun, mut echo), (arg, arg_echo)) = join(
                    eval_node(fun, path.clone(), method, env),
                    eval_node(arg, path, method, env),
                )
                .await;
                echo.extend(arg_echo);
                (fun.zip_with(arg, |f, a| apply(f, a)), echo)
            }
            Node::Transform { inner, f } => {
                let (outcome, echo) = eval_node(inner, path.clone(), method, env).await;
                let outcome = match outcome {
                    Outcome::Success(value) => f(value)
                        .await
                        .map_err(|error| vec![PathError::new(path, error)]),
                    Outcome::Failure(errors) => Outcome::Failure(errors),
                };
                (outcome, echo)
            }
            Node::Named { name, inner } => eval_node(inner, path.child(name.clone()), method, env).await,
        }
    }
    .boxed()
}
