#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that answers path requests for freshly spawned hostiles.
//!
//! Requests are served from a [`PathProvider`]. While the provider has not
//! published a path the request is retried a bounded number of times, after
//! which a synthesized fallback path is assigned so no hostile stays unpathed.

use rampart_core::{Command, Event, FallbackPath, PathProvider, PathingConfig, Vec2};

/// Path assignment system with bounded retries.
#[derive(Debug)]
pub struct Pathing {
    config: PathingConfig,
}

impl Pathing {
    /// Creates a pathing system using the provided retry policy.
    #[must_use]
    pub fn new(config: PathingConfig) -> Self {
        Self { config }
    }

    /// Emits `AssignPath` or `RetryPath` commands for every `PathRequested` event.
    pub fn handle<P>(&mut self, events: &[Event], provider: &mut P, out: &mut Vec<Command>)
    where
        P: PathProvider + ?Sized,
    {
        for event in events {
            let Event::PathRequested {
                hostile,
                kind,
                attempt,
            } = *event
            else {
                continue;
            };

            if let Some(waypoints) = provider.path_for(kind).filter(|path| !path.is_empty()) {
                out.push(Command::AssignPath {
                    hostile,
                    waypoints,
                });
                continue;
            }

            if attempt < self.config.max_retries {
                out.push(Command::RetryPath {
                    hostile,
                    attempt: attempt + 1,
                    delay: self.config.retry_delay(),
                });
                continue;
            }

            tracing::warn!(?hostile, ?kind, attempt, "no path published, using fallback path");
            out.push(Command::AssignPath {
                hostile,
                waypoints: synthesize_fallback(&self.config.fallback),
            });
        }
    }
}

/// Builds a zig-zag path that advances along +x from the fallback origin.
#[must_use]
pub fn synthesize_fallback(shape: &FallbackPath) -> Vec<Vec2> {
    let segments = shape.segments.max(1);
    let mut waypoints = Vec::with_capacity(segments as usize + 1);
    waypoints.push(shape.origin);
    for segment in 1..=segments {
        let lateral = if segment % 2 == 1 {
            shape.amplitude
        } else {
            -shape.amplitude
        };
        waypoints.push(
            shape.origin + Vec2::new(shape.segment_length * segment as f32, lateral),
        );
    }
    waypoints
}
