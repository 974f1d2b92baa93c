//! # HAX Testing Utils
//!
//! Shared testing utilities for the HA command dispatcher workspace.
//!
//! ## Features
//!
//! - **Mock Collaborators**: recording implementations of `RuntimeFacade`,
//!   `CoordinationClient` and `EventPublisher` with injectable failures
//! - **Fixtures**: ready-made command payloads
//! - **Test Containers**: Redis container for event publisher tests
//! - **Helpers**: polling waits for threaded tests
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! hax-testing-utils = { path = "../testing-utils" }
//! ```
//!
//! ```rust
//! use hax_testing_utils::{MockRuntime, RuntimeCall};
//! use hax_core::{Fid, RuntimeFacade};
//!
//! let runtime = MockRuntime::new();
//! runtime.start_repair(&Fid::new(1, 2)).unwrap();
//! assert_eq!(runtime.calls(), vec![RuntimeCall::StartRepair(Fid::new(1, 2))]);
//! ```

pub mod builders;
pub mod containers;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use containers::*;
pub use helpers::*;
pub use mocks::*;
