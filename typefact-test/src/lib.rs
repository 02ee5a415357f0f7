// Commit fixtures and helpers shared by the integration tests.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Once};

use typefact_core::config::TypeFactConfig;
use typefact_core::context::Context;
use typefact_core::global_context::{FileStatus, GlobalContext, SourceFile};
use typefact_core::qualify::Qualifier;
use typefact_core::type_fact::TypeFact;
use typefact_graphs::{JavaFile, TypeGraph};

/// Install a `tracing` subscriber honouring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Files of one analyzed commit, keyed by repository path.
#[derive(Debug, Default, Clone)]
pub struct Commit {
    pub files: BTreeMap<String, SourceFile>,
}

impl Commit {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: &str, status: FileStatus, content: &str) -> Self {
        self.files.insert(path.to_string(), SourceFile::new(content, status));
        self
    }

    pub fn global_context(&self) -> anyhow::Result<GlobalContext> {
        self.global_context_with(&TypeFactConfig::default())
    }

    pub fn global_context_with(&self, config: &TypeFactConfig) -> anyhow::Result<GlobalContext> {
        Ok(GlobalContext::from_sources(&self.files, config)?)
    }

    /// Parse the file at `path` with the syntax adapter.
    pub fn java_file(&self, path: &str) -> anyhow::Result<JavaFile> {
        let file = self
            .files
            .get(path)
            .ok_or_else(|| anyhow::anyhow!("no file {path} in fixture"))?;
        Ok(JavaFile::parse(&file.content, path)?)
    }

    /// Write every file under `root`, mirroring the repository layout.
    pub fn write_to(&self, root: &Path) -> anyhow::Result<()> {
        for (path, file) in &self.files {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, &file.content)?;
        }
        Ok(())
    }
}

/// A small zoo: `Dog` and `Cat` extend `Animal`, `Size` is an enum, and
/// `Keeper` is the file under change ([`KEEPER_BEFORE`] → [`KEEPER_AFTER`]).
pub fn zoo() -> Commit {
    Commit::new()
        .with(
            "src/main/java/zoo/Animal.java",
            FileStatus::Unchanged,
            "package zoo;\n\npublic abstract class Animal {\n    protected String name;\n}\n",
        )
        .with(
            "src/main/java/zoo/Dog.java",
            FileStatus::Unchanged,
            "package zoo;\n\npublic class Dog extends Animal {\n    private Size size;\n}\n",
        )
        .with(
            "src/main/java/zoo/Cat.java",
            FileStatus::After,
            "package zoo;\n\npublic class Cat extends Animal implements Comparable<Cat> {\n    public int compareTo(Cat o) { return 0; }\n}\n",
        )
        .with(
            "src/main/java/zoo/Size.java",
            FileStatus::Unchanged,
            "package zoo;\n\npublic enum Size { SMALL, LARGE }\n",
        )
        .with(
            "src/main/java/zoo/Keeper.java",
            FileStatus::After,
            KEEPER_AFTER,
        )
}

pub const KEEPER_BEFORE: &str = r"
package zoo;

import java.util.List;

public class Keeper {
    private Dog favourite;
    private List<String> names;
    private String[] tags;
    private Integer count;
    private int total;
    private String size;
}
";

pub const KEEPER_AFTER: &str = r"
package zoo;

import java.util.List;

public class Keeper {
    private Animal favourite;
    private List<Integer> names;
    private String tags;
    private int count;
    private long total;
    private Size size;
}
";

/// Qualify `text` in `package` (with `java.util.*` imported) against `gc`.
pub fn fact(text: &str, package: &str, gc: &GlobalContext) -> anyhow::Result<TypeFact> {
    let graph = TypeGraph::parse(text)?;
    let context = Arc::new(Context::new(
        package,
        typefact_graphs::Imports {
            single: Vec::new(),
            on_demand: vec!["java.util".into()],
        },
        Vec::new(),
        BTreeMap::new(),
        Default::default(),
    ));
    let mut qualifier = Qualifier::default();
    Ok(TypeFact::with_qualifier(&graph, context, &mut qualifier).qualify(&mut qualifier, gc))
}
