//! End-to-end scenario tests for the Call Orchestrator (SPEC_FULL.md §8,
//! "End-to-end scenarios"), driven entirely through the public `Call` API
//! against hand-rolled collaborator fakes — no host RTC stack, signaling
//! server, or real device involved.

mod common;
mod offerer_answerer;
mod reconnection;
