/*!
 * Interval ticker tests entry point
 */

#[path = "ticker/harness.rs"]
mod harness;

#[path = "ticker/scenario_test.rs"]
mod scenario_test;

#[path = "ticker/lifecycle_test.rs"]
mod lifecycle_test;

#[path = "ticker/cancel_test.rs"]
mod cancel_test;

#[path = "ticker/backlog_test.rs"]
mod backlog_test;
