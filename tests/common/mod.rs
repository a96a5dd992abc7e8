//! Shared fixtures: a plug-in repository and a documentation checkout, each with a bare remote.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;
use tempfile::TempDir;

pub const METADATA_FILE: &str = "export_layers/config.py";
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";
pub const ARTIFACTS_DIR: &str = "installers/output";

pub const CONFIG_PY: &str = "\
# -*- coding: utf-8 -*-
c.PLUGIN_NAME = \"export_layers\"
c.PLUGIN_VERSION = \"1.2.0\"
c.PLUGIN_VERSION_RELEASE_DATE = \"January 01, 2020\"
c.AUTHOR_NAME = \"khalim19\"
c.REPOSITORY_NAME = \"gimp-plugin-export-layers\"
";

pub const CHANGELOG_MD: &str = "\
Unreleased
==========

* Added exporting to WebP.

1.2.0
=====

* Initial notes.
";

pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = ProcessCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git runs");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn init_git_repo(dir: &Path, branch: &str) {
    fs::create_dir_all(dir).expect("create repo dir");
    run_git(dir, &["init", "-q", "-b", branch]);
    run_git(dir, &["config", "user.name", "Release Test"]);
    run_git(dir, &["config", "user.email", "release@example.com"]);
    run_git(dir, &["config", "commit.gpgsign", "false"]);
    run_git(dir, &["config", "tag.gpgsign", "false"]);
}

fn init_bare_remote(path: &Path) {
    fs::create_dir_all(path).expect("create remote dir");
    run_git(path, &["init", "-q", "--bare"]);
}

fn write(path: &Path, content: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, content).expect("write file");
}

/// State of a working tree worth comparing before and after a run
#[derive(Debug, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub head: String,
    pub tags: String,
    pub status: String,
}

pub struct Fixture {
    _temp: TempDir,
    pub main: PathBuf,
    pub docs: PathBuf,
    pub main_remote: PathBuf,
    pub docs_remote: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let main = temp.path().join("plugin");
        let docs = temp.path().join("gh-pages");
        let main_remote = temp.path().join("plugin.git");
        let docs_remote = temp.path().join("gh-pages.git");

        init_bare_remote(&main_remote);
        init_bare_remote(&docs_remote);

        init_git_repo(&main, "master");
        write(&main.join(METADATA_FILE), CONFIG_PY);
        write(&main.join(CHANGELOG_FILE), CHANGELOG_MD);
        write(&main.join(".gitignore"), "installers/output/\n");
        run_git(&main, &["add", "--all"]);
        run_git(&main, &["commit", "-q", "-m", "Release 1.2.0"]);
        run_git(&main, &["tag", "-a", "1.2.0", "-m", "Release 1.2.0"]);
        run_git(&main, &["remote", "add", "origin", main_remote.to_str().expect("utf-8 path")]);

        init_git_repo(&docs, "gh-pages");
        write(&docs.join("index.html"), "<html></html>\n");
        write(&docs.join("sections/index.md"), "published\n");
        write(&docs.join("sections/obsolete.md"), "to be removed\n");
        write(&docs.join("images/logo.png"), [0u8, 1, 2]);
        write(&docs.join("dev/sections/index.md"), "development\n");
        write(&docs.join("dev/images/logo.png"), [0u8, 1, 2, 3]);
        run_git(&docs, &["add", "--all"]);
        run_git(&docs, &["commit", "-q", "-m", "Documentation for 1.2.0"]);
        run_git(&docs, &["remote", "add", "origin", docs_remote.to_str().expect("utf-8 path")]);

        Self {
            _temp: temp,
            main,
            docs,
            main_remote,
            docs_remote,
        }
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.main.join(ARTIFACTS_DIR)
    }

    pub fn read_main(&self, relative: &str) -> String {
        fs::read_to_string(self.main.join(relative)).expect("read main file")
    }

    pub fn read_docs(&self, relative: &str) -> String {
        fs::read_to_string(self.docs.join(relative)).expect("read docs file")
    }

    pub fn snapshot(dir: &Path) -> TreeSnapshot {
        TreeSnapshot {
            head: run_git(dir, &["rev-parse", "HEAD"]),
            tags: run_git(dir, &["tag", "-l"]),
            status: run_git(dir, &["status", "--porcelain"]),
        }
    }

    /// Refs the bare remote received
    pub fn remote_refs(remote: &Path) -> String {
        run_git(remote, &["for-each-ref", "--format=%(refname)"])
    }

    /// Settings file for driving the binary against this fixture
    pub fn write_settings(&self, api_base: &str, builder: &[&str]) {
        let builder = builder
            .iter()
            .map(|part| format!("'{part}'"))
            .collect::<Vec<_>>()
            .join(", ");
        let settings = format!(
            "docs_repo = '{}'\napi_base = '{api_base}'\nbuilder = [{builder}]\n",
            self.docs.display()
        );
        write(&self.main.join("release.toml"), settings);
        run_git(&self.main, &["add", "release.toml"]);
        run_git(&self.main, &["commit", "-q", "-m", "Add release settings"]);
    }
}
