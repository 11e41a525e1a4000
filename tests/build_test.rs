//! End-to-end tests for building skills from templates and snippet files

use anyhow::Result;
use skillpack::assembler::SkillAssembler;
use skillpack::config::Config;
use skillpack::error::BuildError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn config_for(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.paths.source_root = dir.path().join("src");
    config.paths.output_root = dir.path().join("skills");
    config
}

fn skill_src(dir: &TempDir) -> PathBuf {
    dir.path().join("src").join("chroma")
}

#[tokio::test]
async fn test_build_widgets_typescript_variant() -> Result<()> {
    let dir = TempDir::new()?;
    let src = skill_src(&dir);
    write(&src.join("templates/widgets.md"), "Intro\n{{CODE:setup}}\nDone");
    write(
        &src.join("code/typescript/widgets.ts"),
        "// @snippet:setup\nconst x = 1;\n// @end\n",
    );
    write(
        &src.join("code/python/widgets.py"),
        "# @snippet:setup\nx = 1\n# @end\n",
    );

    let summary = SkillAssembler::new(&config_for(&dir)).build_all().await?;
    assert!(summary.is_ok());
    assert_eq!(summary.topics(), 1);
    assert_eq!(summary.variants_written(), 2);

    let ts = fs::read_to_string(dir.path().join("skills/chroma/widgets/typescript.md"))?;
    assert_eq!(ts, "Intro\n```typescript\nconst x = 1;\n```\nDone");
    let py = fs::read_to_string(dir.path().join("skills/chroma/widgets/python.md"))?;
    assert_eq!(py, "Intro\n```python\nx = 1\n```\nDone");

    Ok(())
}

#[tokio::test]
async fn test_missing_python_file_does_not_abort_when_not_needed() -> Result<()> {
    let dir = TempDir::new()?;
    let src = skill_src(&dir);
    write(&src.join("templates/concepts.md"), "# Concepts\n\nNo code.\n");

    let summary = SkillAssembler::new(&config_for(&dir)).build_all().await?;
    assert!(summary.is_ok());
    assert!(dir
        .path()
        .join("skills/chroma/concepts/typescript.md")
        .exists());
    assert!(dir.path().join("skills/chroma/concepts/python.md").exists());

    Ok(())
}

#[tokio::test]
async fn test_missing_python_file_keep_going_builds_typescript() -> Result<()> {
    let dir = TempDir::new()?;
    let src = skill_src(&dir);
    write(&src.join("templates/widgets.md"), "Intro\n{{CODE:setup}}\nDone");
    write(
        &src.join("code/typescript/widgets.ts"),
        "// @snippet:setup\nconst x = 1;\n// @end\n",
    );

    let mut config = config_for(&dir);
    config.build.fail_fast = false;
    let summary = SkillAssembler::new(&config).build_all().await?;

    assert_eq!(summary.variants_written(), 1);
    let failures = summary.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("widgets [python]"));
    assert!(failures[0].contains("setup"));
    assert!(dir
        .path()
        .join("skills/chroma/widgets/typescript.md")
        .exists());

    Ok(())
}

#[tokio::test]
async fn test_keep_going_index_links_only_written_variants() -> Result<()> {
    let dir = TempDir::new()?;
    let src = skill_src(&dir);
    write(&src.join("SKILL.md"), "# Chroma
");
    write(
        &src.join("templates/widgets.md"),
        "---\nname: Widgets\ndescription: d\n---\n{{CODE:setup}}\n",
    );
    write(
        &src.join("code/typescript/widgets.ts"),
        "// @snippet:setup\nconst x = 1;\n// @end\n",
    );

    let mut config = config_for(&dir);
    config.build.fail_fast = false;
    let summary = SkillAssembler::new(&config).build_all().await?;
    assert_eq!(summary.failures().len(), 1);

    let out = dir.path().join("skills/chroma");
    assert!(!out.join("widgets/python.md").exists());
    assert_eq!(
        fs::read_to_string(out.join("SKILL.md"))?,
        "# Chroma\n\n\
         ## Available Topics\n\
         \n### TypeScript\n\n- [Widgets](widgets/typescript.md): d\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_fail_fast_reports_all_missing_names() -> Result<()> {
    let dir = TempDir::new()?;
    let src = skill_src(&dir);
    write(
        &src.join("templates/querying.md"),
        "{{CODE:a}}\n{{CODE:b}}\n{{CODE:c}}\n",
    );
    write(
        &src.join("code/typescript/querying.ts"),
        "// @snippet:a\nquery();\n// @end\n",
    );

    let err = SkillAssembler::new(&config_for(&dir))
        .build_all()
        .await
        .unwrap_err();

    match &err {
        BuildError::MissingSnippets {
            template,
            language,
            names,
        } => {
            assert!(template.ends_with("templates/querying.md"));
            assert_eq!(language, "typescript");
            assert_eq!(names, &vec!["b".to_string(), "c".to_string()]);
        }
        other => panic!("unexpected error: {}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_root_document_gets_index_and_general_docs_copied() -> Result<()> {
    let dir = TempDir::new()?;
    let src = skill_src(&dir);
    write(
        &src.join("SKILL.md"),
        "---\nname: chroma\ndescription: Chroma docs\n---\n\n# Chroma\n",
    );
    write(
        &src.join("templates/querying.md"),
        "---\nname: Querying\ndescription: Query collections\n---\n\n{{CODE:q}}\n",
    );
    write(
        &src.join("code/typescript/querying.ts"),
        "// @snippet:q\nawait collection.query();\n// @end\n",
    );
    write(
        &src.join("code/python/querying.py"),
        "# @snippet:q\ncollection.query()\n# @end\n",
    );
    let general = "---\nname: Concepts\ndescription: Core ideas\n---\n\nText {{CODE:left-alone}}\n";
    write(&src.join("general/concepts.md"), general);

    let summary = SkillAssembler::new(&config_for(&dir)).build_all().await?;
    assert_eq!(summary.general_docs(), 1);
    assert!(summary.skills[0].root_written);

    let out = dir.path().join("skills/chroma");
    assert_eq!(fs::read_to_string(out.join("concepts.md"))?, general);

    let root = fs::read_to_string(out.join("SKILL.md"))?;
    assert_eq!(
        root,
        "---\nname: chroma\ndescription: Chroma docs\n---\n\n# Chroma\n\n\
         ## Available Topics\n\
         \n### TypeScript\n\n- [Querying](querying/typescript.md): Query collections\n\
         \n### Python\n\n- [Querying](querying/python.md): Query collections\n\
         \n### General\n\n- [Concepts](concepts.md): Core ideas\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_missing_root_document_is_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    let src = skill_src(&dir);
    write(&src.join("templates/intro.md"), "Intro\n");

    let summary = SkillAssembler::new(&config_for(&dir)).build_all().await?;
    assert!(summary.is_ok());
    assert!(!summary.skills[0].root_written);
    assert!(!dir.path().join("skills/chroma/SKILL.md").exists());
    assert!(dir.path().join("skills/chroma/intro/python.md").exists());

    Ok(())
}

#[tokio::test]
async fn test_skill_without_templates_or_general_dirs() -> Result<()> {
    let dir = TempDir::new()?;
    let src = skill_src(&dir);
    write(&src.join("SKILL.md"), "# Empty skill\n");

    let summary = SkillAssembler::new(&config_for(&dir)).build_all().await?;
    assert_eq!(summary.topics(), 0);
    assert_eq!(summary.general_docs(), 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("skills/chroma/SKILL.md"))?,
        "# Empty skill\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_dotted_skill_directories_keep_full_name() -> Result<()> {
    let dir = TempDir::new()?;
    for version in ["chroma.v1", "chroma.v2"] {
        let src = dir.path().join("src").join(version);
        write(&src.join("SKILL.md"), &format!("# {}\n", version));
        write(&src.join("templates/intro.md"), "Intro\n");
    }

    let summary = SkillAssembler::new(&config_for(&dir)).build_all().await?;
    assert!(summary.is_ok());

    let skills = dir.path().join("skills");
    assert!(!skills.join("chroma").exists());
    assert_eq!(
        fs::read_to_string(skills.join("chroma.v1/SKILL.md"))?,
        "# chroma.v1\n\n## Available Topics\n\n### TypeScript\n\n- [](intro/typescript.md)\n\n### Python\n\n- [](intro/python.md)\n"
    );
    assert!(skills.join("chroma.v2/intro/python.md").exists());

    let mut names: Vec<_> = summary.skills.iter().map(|s| s.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["chroma.v1", "chroma.v2"]);

    Ok(())
}

#[tokio::test]
async fn test_missing_source_root_builds_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let summary = SkillAssembler::new(&config_for(&dir)).build_all().await?;
    assert!(summary.skills.is_empty());
    assert!(summary.is_ok());
    Ok(())
}

#[tokio::test]
async fn test_custom_language_set() -> Result<()> {
    let dir = TempDir::new()?;
    let src = skill_src(&dir);
    write(&src.join("templates/hello.md"), "{{CODE:main}}");
    write(
        &src.join("code/go/hello.go"),
        "// @snippet:main\nfmt.Println(\"hi\")\n// @end\n",
    );

    let mut config: Config = toml::from_str(
        r#"
[[languages]]
name = "go"
display_name = "Go"
dir = "go"
extension = "go"
fence = "go"
comment_prefix = "//"
"#,
    )?;
    config.paths.source_root = dir.path().join("src");
    config.paths.output_root = dir.path().join("skills");

    let summary = SkillAssembler::new(&config).build_all().await?;
    assert_eq!(summary.variants_written(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("skills/chroma/hello/go.md"))?,
        "```go\nfmt.Println(\"hi\")\n```"
    );

    Ok(())
}
