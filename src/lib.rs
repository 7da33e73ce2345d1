#![cfg_attr(docsrs, feature(doc_cfg))]
//! wright creates domain objects from user edits and keeps time for the application views.
//!
//! The crate provides two independent components
//!
//! - a [creation workflow](`action::CreateAction`) that builds a new object of a given type,
//!   shows a form to the user, applies the resulting [edits](`patch::PropertyPatch`), saves the
//!   object, links it into its parent and navigates to it.
//! - a [ticking clock](`clock::TickingClock`) that broadcasts the current time with a fixed period
//!   while there is someone listening.
//!
//! # Domain objects
//!
//! [Domain objects](`object::DomainObject`) are JSON objects identified by an
//! [`object::Identifier`]. Besides a few well known properties, objects may hold any nested
//! structure, which can be addressed using dotted [property paths](`PropertyPath`), e.g.
//! `configuration.style.fillColor`.
//!
//! # Creating objects
//!
//! The workflow relies on the host application for rendering forms, storing objects, managing
//! composition, notifying the user and navigating. These capabilities are defined as traits in the
//! [`services`] module and passed to the action as a [`services::Services`] bundle.
//!
//! Creation goes through the stages `Idle -> FormShown -> Saving -> Succeeded | Failed -> Idle`.
//! The current stage can be followed with [`action::CreateAction::stage`].
//!
//! Save failures are reported to the user and returned to the caller as
//! [`errors::PersistenceFailure`]. Malformed form edits and failures after the object has been
//! saved indicate bugs in the application and are returned as is, the workflow does not try to
//! recover from them.
//!
//! # Clock
//!
//! The clock only runs while it has [`clock::TICK`] listeners. Adding the first listener
//! starts the timer and removing the last one stops it.
//!
//! ```rust
//! use std::time::Duration;
//! use tokio_stream::StreamExt;
//! use wright::clock::TickingClock;
//!
//! # tokio_test::block_on(async {
//! let clock = TickingClock::new(Duration::from_millis(10));
//! let created = clock.current_value();
//!
//! // the stream counts as a listener
//! let mut ticks = clock.ticks();
//! assert!(clock.is_running());
//!
//! let now = ticks.next().await.unwrap();
//! assert!(now >= created);
//!
//! // dropping the last listener stops the clock
//! drop(ticks);
//! assert!(!clock.is_running());
//! # })
//! ```
//!
//! # Logging
//!
//! The crate reports its progress using the [tracing crate](https://crates.io/crates/tracing).
//! With the `logging` feature, [`logging::init`] installs a subscriber that writes events to
//! stdout, filtered by the `RUST_LOG` environment variable.

mod path;

pub mod action;
pub mod clock;
pub mod errors;
pub mod object;
pub mod patch;
pub mod services;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

pub use path::{InvalidPath, PropertyPath};
