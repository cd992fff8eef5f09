/// Initial value of error measures that must not pass any tolerance before
/// they are first computed.
pub const HUGE: f64 = 1e100;
