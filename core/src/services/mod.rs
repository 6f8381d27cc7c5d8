//! Business services containing domain logic and use cases.

pub mod verification;

pub use verification::{
    ChallengeService, Clock, CodeDelivery, CodeStore, FixedClock, InMemoryCodeStore,
    OsRandomSource, RandomSource, SeededRandomSource, SendCodeResult, SystemClock,
    VerificationCodeService, VerifyCodeResult,
};
