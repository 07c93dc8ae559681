//! # dispatch-engine
//!
//! Scheduling and route-optimization core for an appointment-booking
//! backend: decides whether a proposed time is free for a resource,
//! enumerates bookable slots across a date range, and orders field-visit
//! waypoints into an efficient sequence.
//!
//! The engine is a library-level contract. HTTP routing, validation,
//! persistence, geocoding, and directions lookups live in the surrounding
//! system; the engine consumes persistence through the read-only
//! [`store::SchedulingStore`] seam and performs no writes.
//!
//! ## Modules
//!
//! - [`temporal`] — wall-clock ↔ instant conversion through IANA timezone rules
//! - [`availability`] — tiered per-day schedule resolution (override → holiday → weekly default)
//! - [`conflict`] — buffer-aware overlap detection against committed appointments
//! - [`slots`] — bookable slot enumeration across a date range
//! - [`route`] — waypoint ordering by simulated annealing over 2-opt moves
//! - [`model`] — shared domain records
//! - [`store`] — persistence interfaces the engine consumes
//! - [`error`] — error types
//!
//! ## Concurrency
//!
//! Every computation is synchronous, reentrant, and free of shared mutable
//! state; independent resources and dates may be scheduled on parallel
//! request handlers with a shared store reference. The engine answers
//! "would this conflict" as a pure query; atomicity between that check and
//! the eventual insert is the write path's responsibility (exclusion
//! constraint or serializable transaction around check + book).

pub mod availability;
pub mod conflict;
pub mod error;
pub mod model;
pub mod route;
pub mod slots;
pub mod store;
pub mod temporal;

pub use availability::{resolve_day, DayAvailability};
pub use conflict::{check_conflicts, intervals_overlap};
pub use error::ScheduleError;
pub use model::{
    Appointment, AppointmentStatus, DefaultAvailability, Holiday, MinuteWindow,
    OverrideAvailability, Service, Slot, Waypoint,
};
pub use route::{
    haversine_km, optimize_waypoint_order, optimize_waypoint_order_with, total_route_km,
    AnnealingConfig,
};
pub use slots::{resolve_available_slots, SlotQuery, DEFAULT_GRANULARITY_MINUTES};
pub use store::{InMemoryStore, SchedulingStore, StoreError};
