//! Wire representations.
//!
//! Response types render entities for clients. Input types are write-masks:
//! they declare exactly the fields a client may set, so anything else in a
//! request body (IDs, hosts, prices, timestamps, unknown keys) is dropped by
//! deserialization and filled in from the actor or the validation layer.
//!
//! | Body          | Used by         | Semantics                         |
//! |---------------|-----------------|-----------------------------------|
//! | `*Input`      | `POST`, `PUT`   | every writable field, defaults    |
//! | `*Patch`      | `PATCH`         | only the fields that are present  |

pub mod booking;
pub mod listing;
pub mod review;
pub mod user;

pub use booking::{BookingInput, BookingPatch, BookingReplace, BookingResponse};
pub use listing::{ListingInput, ListingPatch, ListingResponse};
pub use review::{ReviewInput, ReviewPatch, ReviewReplace, ReviewResponse};
pub use user::UserResponse;
