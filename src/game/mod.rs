// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! Playing against the engine service
//!
//! * `ActionBuilder` turns a drag-and-drop into an `Action`, rejecting the
//!   gesture locally when it cannot be a move.
//!
//! * `GameClient` makes the four engine calls over a `Transport` and keeps
//!   at most one submission outstanding.
//!
//! * `Session` owns the board being shown and only replaces it with a
//!   board the engine returned.
//!

mod client;
mod config;
mod gesture;
mod session;
mod transport;

pub use client::*;
pub use config::*;
pub use gesture::*;
pub use session::*;
pub use transport::*;
