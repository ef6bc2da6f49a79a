//! Local changes made ahead of the server. `apply` changes the state right
//! away so it can be drawn; `Applied::commit` tells the server later and
//! undoes the change if the server says no.

use std::future::Future;

/// A change already applied to local state. Holds whatever `rollback`
/// needs to undo it.
#[must_use = "an applied change should be committed"]
#[derive(Debug)]
pub struct Applied<U>(U);

/// Runs `change` now. Its return value is kept for the rollback.
pub fn apply<S, U>(state: &mut S, change: impl FnOnce(&mut S) -> U) -> Applied<U> {
    Applied(change(state))
}

impl<U> Applied<U> {
    /// Awaits the server call; on error hands the saved value to `rollback`.
    /// The call's result is returned either way.
    pub async fn commit<S, T, E, F>(
        self,
        state: &mut S,
        commit: F,
        rollback: impl FnOnce(&mut S, U),
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let result = commit.await;
        if result.is_err() {
            rollback(state, self.0);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn change_is_visible_before_the_commit() {
        let mut value = 1;
        let applied = apply(&mut value, |v| std::mem::replace(v, 2));
        assert_eq!(value, 2);

        let res: Result<&str, ()> = applied
            .commit(&mut value, async { Ok("ok") }, |v, old| *v = old)
            .await;
        assert_eq!(res, Ok("ok"));
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn rolls_back_on_failure() {
        let mut value = vec!["a"];
        let applied = apply(&mut value, |v| v.push("b"));
        assert_eq!(value, vec!["a", "b"]);

        let res: Result<(), &str> = applied
            .commit(&mut value, async { Err("nope") }, |v, ()| {
                v.pop();
            })
            .await;
        assert_eq!(res, Err("nope"));
        assert_eq!(value, vec!["a"]);
    }
}
