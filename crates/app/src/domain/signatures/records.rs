//! Signature Records

use creator_deals::signatures::{Signature, SignerRole};

use crate::uuids::TypedUuid;

/// Signature UUID
pub type SignatureUuid = TypedUuid<Signature>;

/// Active signature rows of one deal, by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealSignatures {
    pub creator: Option<Signature>,
    pub brand: Option<Signature>,
}

impl DealSignatures {
    /// Sort rows by role. Rows with an unknown role are ignored.
    pub fn from_rows(rows: Vec<Signature>) -> Self {
        rows.into_iter()
            .fold(Self::default(), |mut signatures, row| {
                match row.signer_role {
                    Some(SignerRole::Creator) => signatures.creator = Some(row),
                    Some(SignerRole::Brand) => signatures.brand = Some(row),
                    None => {}
                }

                signatures
            })
    }

    pub fn for_role(&self, role: SignerRole) -> Option<&Signature> {
        match role {
            SignerRole::Creator => self.creator.as_ref(),
            SignerRole::Brand => self.brand.as_ref(),
        }
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        usize::from(self.creator.is_some()) + usize::from(self.brand.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
