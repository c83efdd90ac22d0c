use bitflags::bitflags;

bitflags! {
    /// Grammar features accepted by the evaluator.
    ///
    /// Each flag enables one operator or syntactic form. Flags combine with
    /// `|` and are queried with [`Flags::contains`].
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct Flags: u32 {
        /// Binary `+`.
        const ADDITION = 1;
        /// Binary `-`.
        const SUBTRACTION = 1 << 1;
        /// Binary `*`.
        const MULTIPLICATION = 1 << 2;
        /// Binary `/`.
        const DIVISION = 1 << 3;
        /// Binary `^`.
        const EXPONENTIATION = 1 << 4;
        /// Binary `%`.
        const MODULUS = 1 << 5;
        /// Unary `+`.
        const IDENTITY = 1 << 6;
        /// Unary `-`.
        const NEGATION = 1 << 7;
        /// A number literal directly followed by an identifier multiplies them, as in `2pi`.
        const IMPLICIT_MULTIPLICATION = 1 << 8;
        /// Unbalanced parentheses are closed (or opened) implicitly.
        const IMPLICIT_PARENTHESES = 1 << 9;
        /// Number literals may carry an exponent, as in `2.4e-2`.
        const SCIENTIFIC_NOTATION = 1 << 10;
    }
}

impl Flags {
    /// The common arithmetic subset: the four basic operators, unary signs,
    /// implicit multiplication and scientific notation.
    pub const DEFAULT: Self = Self::ADDITION
        .union(Self::SUBTRACTION)
        .union(Self::MULTIPLICATION)
        .union(Self::DIVISION)
        .union(Self::IDENTITY)
        .union(Self::NEGATION)
        .union(Self::IMPLICIT_MULTIPLICATION)
        .union(Self::SCIENTIFIC_NOTATION);
}

impl Default for Flags {
    fn default() -> Self {
        Self::DEFAULT
    }
}
