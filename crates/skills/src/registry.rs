use std::collections::HashMap;

use {serde::Serialize, tracing::debug};

use crate::{
    error::{Error, Result},
    types::SkillManifest,
};

/// Registry under construction during a scan pass.
///
/// Entries are write-once. [`RegistryBuilder::finish`] turns it into a
/// read-only [`SkillRegistry`]; there is no way back, a rescan starts a new
/// builder.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    skills: Vec<SkillManifest>,
    index: HashMap<String, usize>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a manifest. A name that is already present fails with
    /// [`Error::DuplicateSkill`] and leaves the existing entry untouched.
    pub fn register(&mut self, manifest: SkillManifest) -> Result<()> {
        if let Some(&idx) = self.index.get(&manifest.name) {
            return Err(Error::DuplicateSkill {
                name: manifest.name,
                existing: self.skills[idx].body_path.clone(),
                duplicate: manifest.body_path,
            });
        }
        debug!(name = %manifest.name, path = %manifest.body_path.display(), "registered skill");
        self.index.insert(manifest.name.clone(), self.skills.len());
        self.skills.push(manifest);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SkillManifest> {
        self.index.get(name).map(|&idx| &self.skills[idx])
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn finish(self) -> SkillRegistry {
        SkillRegistry {
            skills: self.skills,
            index: self.index,
        }
    }
}

/// Read-only collection of the skills from one scan pass, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkillRegistry {
    skills: Vec<SkillManifest>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SkillRegistry {
    /// Manifest registered under `name`, or [`Error::NotFound`].
    pub fn lookup(&self, name: &str) -> Result<&SkillManifest> {
        self.index
            .get(name)
            .map(|&idx| &self.skills[idx])
            .ok_or_else(|| Error::not_found(name))
    }

    /// All manifests in discovery order. Each call starts over.
    pub fn all(&self) -> std::slice::Iter<'_, SkillManifest> {
        self.skills.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(|s| s.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl PartialEq for SkillRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.skills == other.skills
    }
}

impl Eq for SkillRegistry {}

impl<'a> IntoIterator for &'a SkillRegistry {
    type IntoIter = std::slice::Iter<'a, SkillManifest>;
    type Item = &'a SkillManifest;

    fn into_iter(self) -> Self::IntoIter {
        self.all()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::frontmatter::FrontMatter, std::path::PathBuf};

    fn manifest(name: &str, dir: &str) -> SkillManifest {
        let root = PathBuf::from(dir);
        SkillManifest {
            name: name.into(),
            description: format!("{name} skill"),
            allowed_tools: vec![],
            license: None,
            compatibility: None,
            extra: FrontMatter::default(),
            body_path: root.join("SKILL.md"),
            root,
            body: String::new(),
            asset_paths: vec![],
            reference_paths: vec![],
            script_paths: vec![],
        }
    }

    #[test]
    fn lookup_returns_registered_manifest() {
        let mut builder = RegistryBuilder::new();
        let foo = manifest("foo", "/skills/foo");
        builder.register(foo.clone()).unwrap();
        let reg = builder.finish();

        assert_eq!(reg.lookup("foo").unwrap(), &foo);
        assert!(reg.contains("foo"));
        assert!(matches!(reg.lookup("baz"), Err(Error::NotFound { ref name }) if name == "baz"));
    }

    #[test]
    fn duplicate_is_rejected_and_first_entry_kept() {
        let mut builder = RegistryBuilder::new();
        let first = manifest("dup", "/skills/one");
        builder.register(first.clone()).unwrap();

        let err = builder.register(manifest("dup", "/skills/two")).unwrap_err();
        match err {
            Error::DuplicateSkill {
                name,
                existing,
                duplicate,
            } => {
                assert_eq!(name, "dup");
                assert_eq!(existing, PathBuf::from("/skills/one/SKILL.md"));
                assert_eq!(duplicate, PathBuf::from("/skills/two/SKILL.md"));
            },
            other => panic!("expected DuplicateSkill, got {other:?}"),
        }
        assert_eq!(builder.len(), 1);
        assert_eq!(builder.get("dup"), Some(&first));
    }

    #[test]
    fn all_preserves_insertion_order_and_restarts() {
        let mut builder = RegistryBuilder::new();
        for name in ["zeta", "alpha", "mid"] {
            builder.register(manifest(name, &format!("/s/{name}"))).unwrap();
        }
        let reg = builder.finish();

        let first: Vec<_> = reg.names().collect();
        assert_eq!(first, vec!["zeta", "alpha", "mid"]);
        let second: Vec<_> = reg.all().map(|m| m.name.as_str()).collect();
        assert_eq!(first, second);
        assert_eq!((&reg).into_iter().count(), 3);
    }

    #[test]
    fn empty_registry() {
        let reg = RegistryBuilder::new().finish();
        assert!(reg.is_empty());
        assert_eq!(reg.all().count(), 0);
        assert_eq!(reg, SkillRegistry::default());
    }
}
