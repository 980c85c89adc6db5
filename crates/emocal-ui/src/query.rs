//! Request lifecycle for one query kind (geocode, daily, hourly).
//!
//! Each change of inputs bumps a generation counter and cancels the previous
//! call's token. Completions carry the generation they were issued under and
//! are dropped unless it is still current, so only the most recently
//! triggered call can change state.

use std::fmt;

use emocal_weather::WeatherError;
use tokio_util::sync::CancellationToken;

use crate::error_mapping::map_weather_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    /// Inputs absent; nothing requested
    #[default]
    Idle,
    Loading,
    Ready,
    /// Call succeeded (or was skipped) with nothing to show
    Empty,
    Error,
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Empty => "empty",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Result of one call, as applied to a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Data(T),
    Empty(String),
    Failed(String),
}

impl<T> From<Result<T, WeatherError>> for Outcome<T> {
    fn from(result: Result<T, WeatherError>) -> Self {
        match result {
            Ok(data) => Outcome::Data(data),
            Err(e) => {
                let err = map_weather_error(e);
                let message = err.user_message().to_string();
                if err.is_empty_result() {
                    Outcome::Empty(message)
                } else {
                    Outcome::Failed(message)
                }
            }
        }
    }
}

/// Authorization for exactly one outbound call.
#[derive(Debug, Clone)]
pub struct Ticket<I> {
    pub generation: u64,
    pub inputs: I,
    pub token: CancellationToken,
}

#[derive(Debug)]
pub struct Query<I, T> {
    name: &'static str,
    inputs: Option<I>,
    generation: u64,
    status: QueryStatus,
    data: Option<T>,
    message: Option<String>,
    cancel: Option<CancellationToken>,
}

impl<I, T> Query<I, T>
where
    I: Clone + PartialEq + fmt::Debug,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inputs: None,
            generation: 0,
            status: QueryStatus::Idle,
            data: None,
            message: None,
            cancel: None,
        }
    }

    /// Point the query at new inputs. Returns a ticket when a call must be
    /// issued; `None` when the inputs are unchanged or absent.
    pub fn trigger(&mut self, inputs: Option<I>) -> Option<Ticket<I>> {
        if self.inputs == inputs {
            return None;
        }
        self.supersede();
        self.inputs = inputs.clone();

        match inputs {
            None => {
                tracing::debug!(query = self.name, "Inputs cleared, going idle");
                self.status = QueryStatus::Idle;
                None
            }
            Some(inputs) => {
                tracing::debug!(
                    query = self.name,
                    generation = self.generation,
                    "Issuing call for {:?}",
                    inputs
                );
                let token = CancellationToken::new();
                self.cancel = Some(token.clone());
                self.status = QueryStatus::Loading;
                Some(Ticket {
                    generation: self.generation,
                    inputs,
                    token,
                })
            }
        }
    }

    /// Record inputs known to have no data without issuing a call.
    pub fn skip(&mut self, inputs: I, reason: &str) {
        if self.inputs.as_ref() == Some(&inputs) {
            return;
        }
        self.supersede();
        tracing::debug!(query = self.name, "Skipping call for {:?}: {}", inputs, reason);
        self.inputs = Some(inputs);
        self.status = QueryStatus::Empty;
        self.message = Some(reason.to_string());
    }

    /// Forget the current inputs so the next trigger issues a fresh call.
    pub fn invalidate(&mut self) {
        self.supersede();
        self.inputs = None;
        self.status = QueryStatus::Idle;
    }

    /// Apply a completion. Returns false (and changes nothing) when the
    /// completion belongs to a superseded call.
    pub fn complete(&mut self, generation: u64, outcome: Outcome<T>) -> bool {
        if generation != self.generation || self.status != QueryStatus::Loading {
            tracing::debug!(
                query = self.name,
                generation,
                current = self.generation,
                "Dropping stale completion"
            );
            return false;
        }

        self.cancel = None;
        match outcome {
            Outcome::Data(data) => {
                self.data = Some(data);
                self.message = None;
                self.status = QueryStatus::Ready;
            }
            Outcome::Empty(message) => {
                tracing::info!(query = self.name, "No data: {}", message);
                self.message = Some(message);
                self.status = QueryStatus::Empty;
            }
            Outcome::Failed(message) => {
                tracing::warn!(query = self.name, "Call failed: {}", message);
                self.message = Some(message);
                self.status = QueryStatus::Error;
            }
        }
        true
    }

    fn supersede(&mut self) {
        self.generation += 1;
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.data = None;
        self.message = None;
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn inputs(&self) -> Option<&I> {
        self.inputs.as_ref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// User-facing reason for `Empty`/`Error`
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> Query<&'static str, String> {
        Query::new("test")
    }

    #[test]
    fn test_absent_inputs_stay_idle() {
        let mut q = query();
        assert!(q.trigger(None).is_none());
        assert_eq!(q.status(), QueryStatus::Idle);
        assert_eq!(q.generation(), 0);
    }

    #[test]
    fn test_trigger_then_complete() {
        let mut q = query();
        let ticket = q.trigger(Some("A")).unwrap();
        assert_eq!(q.status(), QueryStatus::Loading);
        assert_eq!(ticket.inputs, "A");

        assert!(q.complete(ticket.generation, Outcome::Data("a".to_string())));
        assert_eq!(q.status(), QueryStatus::Ready);
        assert_eq!(q.data().map(String::as_str), Some("a"));
    }

    #[test]
    fn test_unchanged_inputs_issue_no_call() {
        let mut q = query();
        let ticket = q.trigger(Some("A")).unwrap();
        assert!(q.trigger(Some("A")).is_none());
        assert!(!ticket.token.is_cancelled());
        assert_eq!(q.generation(), ticket.generation);
    }

    #[test]
    fn test_out_of_order_completions_keep_latest() {
        let mut q = query();
        let a = q.trigger(Some("A")).unwrap();
        let b = q.trigger(Some("B")).unwrap();
        let c = q.trigger(Some("C")).unwrap();

        assert!(a.token.is_cancelled());
        assert!(b.token.is_cancelled());
        assert!(!c.token.is_cancelled());

        // C resolves first, then the superseded calls straggle in
        assert!(q.complete(c.generation, Outcome::Data("c".to_string())));
        assert!(!q.complete(a.generation, Outcome::Data("a".to_string())));
        assert!(!q.complete(b.generation, Outcome::Failed("boom".to_string())));

        assert_eq!(q.status(), QueryStatus::Ready);
        assert_eq!(q.data().map(String::as_str), Some("c"));
        assert_eq!(q.inputs(), Some(&"C"));
    }

    #[test]
    fn test_stale_completion_while_loading_is_ignored() {
        let mut q = query();
        let a = q.trigger(Some("A")).unwrap();
        let b = q.trigger(Some("B")).unwrap();

        assert!(!q.complete(a.generation, Outcome::Data("a".to_string())));
        assert_eq!(q.status(), QueryStatus::Loading);
        assert!(q.data().is_none());

        assert!(q.complete(b.generation, Outcome::Empty("none".to_string())));
        assert_eq!(q.status(), QueryStatus::Empty);
        assert_eq!(q.message(), Some("none"));
    }

    #[test]
    fn test_clearing_inputs_drops_in_flight_call() {
        let mut q = query();
        let a = q.trigger(Some("A")).unwrap();
        assert!(q.trigger(None).is_none());
        assert!(a.token.is_cancelled());
        assert_eq!(q.status(), QueryStatus::Idle);
        assert!(!q.complete(a.generation, Outcome::Data("a".to_string())));
        assert_eq!(q.status(), QueryStatus::Idle);
    }

    #[test]
    fn test_new_inputs_replace_data_wholesale() {
        let mut q = query();
        let a = q.trigger(Some("A")).unwrap();
        q.complete(a.generation, Outcome::Data("a".to_string()));

        q.trigger(Some("B")).unwrap();
        assert!(q.data().is_none());
        assert_eq!(q.status(), QueryStatus::Loading);
    }

    #[test]
    fn test_failure_sets_error_status() {
        let mut q = query();
        let a = q.trigger(Some("A")).unwrap();
        assert!(q.complete(a.generation, Outcome::Failed("offline".to_string())));
        assert_eq!(q.status(), QueryStatus::Error);
        assert_eq!(q.message(), Some("offline"));
    }

    #[test]
    fn test_skip_marks_empty_without_ticket() {
        let mut q = query();
        let a = q.trigger(Some("A")).unwrap();
        q.skip("B", "outside horizon");
        assert!(a.token.is_cancelled());
        assert_eq!(q.status(), QueryStatus::Empty);
        assert!(q.trigger(Some("B")).is_none());
        assert_eq!(q.status(), QueryStatus::Empty);
    }

    #[test]
    fn test_invalidate_allows_refetch_of_same_inputs() {
        let mut q = query();
        let a = q.trigger(Some("A")).unwrap();
        q.complete(a.generation, Outcome::Failed("offline".to_string()));

        q.invalidate();
        let again = q.trigger(Some("A")).unwrap();
        assert!(again.generation > a.generation);
        assert_eq!(q.status(), QueryStatus::Loading);
    }

    #[test]
    fn test_outcome_from_weather_result() {
        let empty: Outcome<()> = Err(WeatherError::NotFound("Springfield".into())).into();
        assert!(matches!(empty, Outcome::Empty(_)));

        let failed: Outcome<()> = Err(WeatherError::Server {
            status: 502,
            message: "bad gateway".into(),
        })
        .into();
        assert!(matches!(failed, Outcome::Failed(_)));

        let data: Outcome<u8> = Ok(7).into();
        assert_eq!(data, Outcome::Data(7));
    }
}
