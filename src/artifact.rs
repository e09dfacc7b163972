use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::trade::Signee;

/// Handle to a composed contract on disk plus the caller-side record of
/// which roles have signed it so far. Completeness lives here, not in the
/// document: the PDF itself carries no "fully signed" marker.
#[derive(Debug, Clone)]
pub struct ArtifactHandle {
    path: PathBuf,
    signed: BTreeSet<Signee>,
}

impl ArtifactHandle {
    pub fn new(path: PathBuf) -> ArtifactHandle {
        ArtifactHandle {
            path,
            signed: BTreeSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_signed_by(&self, signee: Signee) -> bool {
        self.signed.contains(&signee)
    }

    pub fn is_fully_signed(&self) -> bool {
        self.signed.len() == Signee::ALL.len()
    }

    pub(crate) fn mark_signed(&mut self, signee: Signee) {
        self.signed.insert(signee);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_roles_until_fully_signed() {
        let mut handle = ArtifactHandle::new(PathBuf::from("test_2024-03-01.pdf"));
        assert!(!handle.is_fully_signed());
        handle.mark_signed(Signee::Buyer);
        handle.mark_signed(Signee::Buyer);
        assert!(handle.is_signed_by(Signee::Buyer));
        assert!(!handle.is_fully_signed());
        handle.mark_signed(Signee::Seller);
        handle.mark_signed(Signee::Admin);
        assert!(handle.is_fully_signed());
    }
}
