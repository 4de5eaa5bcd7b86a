// The shape of this type follows the Decimal of the cosmwasm-std crate, which is licensed under
// the Apache License 2.0 - https://github.com/CosmWasm/cosmwasm.

#![no_std]

/// An unsigned fixed-point number with 18 fractional digits, stored as atomic units.
///
/// All arithmetic is checked: an operation that would overflow returns `None`, and the
/// caller decides which error that becomes. Results are always rounded down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Decimal(u128);

impl Decimal {
    const DECIMAL_FRACTIONAL: u128 = 1_000_000_000_000_000_000u128; // 1*10**18

    pub const fn raw(value: u128) -> Self {
        Self(value)
    }

    /// Create a 1.0 Decimal
    #[inline]
    pub const fn one() -> Self {
        Self(Self::DECIMAL_FRACTIONAL)
    }

    /// Create a 0.0 Decimal
    #[inline]
    pub const fn zero() -> Self {
        Self(0u128)
    }

    /// Convert x% into Decimal
    pub const fn percent(x: u64) -> Self {
        Self((x as u128) * 10_000_000_000_000_000)
    }

    /// Convert basis points (x/10000) into Decimal
    pub const fn bps(x: u64) -> Self {
        Self((x as u128) * 100_000_000_000_000)
    }

    /// `numerator / denominator`, rounded down.
    ///
    /// Returns `None` for a zero denominator or a quotient that does not fit.
    pub fn from_ratio(numerator: impl Into<u128>, denominator: impl Into<u128>) -> Option<Self> {
        let numerator: u128 = numerator.into();
        let denominator: u128 = denominator.into();
        if denominator == 0 {
            return None;
        }

        // floor(n * F / d) == (n / d) * F + floor((n % d) * F / d)
        let whole = (numerator / denominator).checked_mul(Self::DECIMAL_FRACTIONAL)?;
        let fraction =
            (numerator % denominator).checked_mul(Self::DECIMAL_FRACTIONAL)? / denominator;
        whole.checked_add(fraction).map(Self)
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0u128
    }

    /// `value * self`, rounded down.
    ///
    /// `value` is split at the fractional unit so that token amounts with 18 decimals of
    /// their own can be scaled without a 256-bit intermediate.
    pub fn checked_mul_int(self, value: u128) -> Option<u128> {
        if value == 0 || self.is_zero() {
            return Some(0);
        }
        let whole = value / Self::DECIMAL_FRACTIONAL;
        let rest = value % Self::DECIMAL_FRACTIONAL;

        whole
            .checked_mul(self.0)?
            .checked_add(rest.checked_mul(self.0)? / Self::DECIMAL_FRACTIONAL)
    }

    pub fn checked_mul(self, other: Self) -> Option<Self> {
        other.checked_mul_int(self.0).map(Self)
    }

    pub fn checked_pow(self, exp: u32) -> Option<Self> {
        (0..exp).try_fold(Self::one(), |acc, _| acc.checked_mul(self))
    }
}
