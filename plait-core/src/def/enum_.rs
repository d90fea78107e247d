use core::any::Any;

/// One variant of a fieldless enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variant {
    /// declared name
    pub name: &'static str,
    /// integer discriminant
    pub discriminant: i64,
}

impl Variant {
    /// Const ctor.
    pub const fn new(name: &'static str, discriminant: i64) -> Self {
        Self { name, discriminant }
    }
}

/// Returns the index of the variant `value` holds.
pub type VariantIndexFn = fn(value: &dyn Any) -> Option<usize>;

/// Builds the variant at the given index.
pub type FromIndexFn = fn(index: usize) -> Option<Box<dyn Any>>;

/// Describes a fieldless enum.
#[derive(Clone, Copy, Debug)]
pub struct EnumDef {
    /// variants, in declaration order
    pub variants: &'static [Variant],
    /// cf. [`VariantIndexFn`]
    pub variant_index: VariantIndexFn,
    /// cf. [`FromIndexFn`]
    pub from_index: FromIndexFn,
}

impl EnumDef {
    /// Const ctor.
    pub const fn new(
        variants: &'static [Variant],
        variant_index: VariantIndexFn,
        from_index: FromIndexFn,
    ) -> Self {
        Self {
            variants,
            variant_index,
            from_index,
        }
    }

    /// The variant `value` holds.
    pub fn variant_of(&self, value: &dyn Any) -> Option<&'static Variant> {
        (self.variant_index)(value).and_then(|index| self.variants.get(index))
    }

    /// Index of the variant with this name, ignoring ASCII case.
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.variants
            .iter()
            .position(|variant| variant.name.eq_ignore_ascii_case(name))
    }

    /// Index of the variant with this discriminant.
    pub fn index_of_discriminant(&self, discriminant: i64) -> Option<usize> {
        self.variants
            .iter()
            .position(|variant| variant.discriminant == discriminant)
    }

    /// Builds the variant at `index`.
    pub fn make(&self, index: usize) -> Option<Box<dyn Any>> {
        (self.from_index)(index)
    }
}
