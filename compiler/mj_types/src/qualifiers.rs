//! Type qualifiers.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Qualifier set carried by `TypeData::Qualified`.
    ///
    /// Never empty inside a qualified type; qualifying with an empty set
    /// returns the base type unchanged.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Qualifiers: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const SAFE = 1 << 2;
        const MUTABLE = 1 << 3;
    }
}

impl Qualifiers {
    const SPELLINGS: [(Qualifiers, &'static str); 4] = [
        (Qualifiers::CONST, "const"),
        (Qualifiers::VOLATILE, "volatile"),
        (Qualifiers::SAFE, "safe"),
        (Qualifiers::MUTABLE, "mutable"),
    ];
}

impl fmt::Display for Qualifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, spelling) in Self::SPELLINGS {
            if self.contains(flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(spelling)?;
                first = false;
            }
        }
        Ok(())
    }
}
