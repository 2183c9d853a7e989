use std::future::Future;

/// Applies a change before its persistence has been confirmed.
///
/// The previous state is kept as a snapshot. When the commit fails the
/// snapshot is restored and the error is surfaced to the caller.
pub async fn apply<T, V, E>(
    state: &mut T,
    change: T,
    commit: impl Future<Output = Result<V, E>>,
) -> Result<V, E> {
    let snapshot = std::mem::replace(state, change);

    match commit.await {
        Ok(value) => Ok(value),
        Err(err) => {
            *state = snapshot;
            Err(err)
        }
    }
}
