//! Domain entities representing core business objects.

pub mod verification_code;


pub use verification_code::{
    compute_expiration, is_expired, is_well_formed, VerificationCode, CODE_LENGTH, CODE_MAX,
    CODE_MIN, DEFAULT_EXPIRATION_MINUTES, MAX_ATTEMPTS,
};
