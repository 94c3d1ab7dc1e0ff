use crate::{
    builder::RenderContext,
    error::CompileError,
    registry::{BuilderRegistry, Language},
};
use brine_wire_schema::{is_identifier, Schema};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One rendered output file, relative to the project directory.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub path:     PathBuf,
    pub contents: String,
}

/// Renders `schema` in `language` for `project`.
///
/// The language's emitter and every builder the schema needs are looked up,
/// and the emitter's checks run, before anything is rendered. A missing
/// `(language, kind)` pair or a schema the language cannot represent fails
/// without producing output.
pub fn generate(
    schema: &Schema,
    registry: &BuilderRegistry,
    language: Language,
    project: &str,
) -> Result<Vec<GeneratedFile>, CompileError> {
    if !is_identifier(project) {
        return Err(CompileError::InvalidProject(project.to_string()));
    }

    let emitter = registry.emitter(language)?;
    for def in schema.ordered() {
        registry.get(language, def.kind())?;
    }

    let ctx = RenderContext { schema, registry, language, project };
    emitter.check(&ctx)?;
    let files = emitter.emit(&ctx)?;

    info!(
        schema = schema.name(),
        %language,
        project,
        files = files.len(),
        "generated project"
    );
    Ok(files)
}

/// Writes `files` under `dir`.
///
/// Files are first written to a staging directory inside `dir` and only
/// moved into place once all of them were written. Files they replace are
/// moved aside first; if a move fails, the files already moved are taken
/// back out and the replaced ones restored, so `dir` keeps its old contents.
pub fn write_project(dir: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, CompileError> {
    fs::create_dir_all(dir)?;
    let staging = dir.join(format!(".bwire-staging-{}", std::process::id()));
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    let fresh = staging.join("new");
    let replaced = staging.join("old");

    let result = stage(&fresh, files).and_then(|()| {
        let mut moves = Vec::with_capacity(files.len());
        let installed = install(dir, &fresh, &replaced, files, &mut moves);
        if installed.is_err() {
            roll_back(&moves);
        }
        installed
    });
    let cleaned = fs::remove_dir_all(&staging);

    let written = result?;
    cleaned?;
    Ok(written)
}

/// One target that was put in place, and where its previous contents went.
struct Move {
    target:   PathBuf,
    previous: Option<PathBuf>,
}

fn stage(staging: &Path, files: &[GeneratedFile]) -> Result<(), CompileError> {
    for file in files {
        let path = staging.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.contents)?;
        debug!(path = %path.display(), bytes = file.contents.len(), "staged file");
    }
    Ok(())
}

fn install(
    dir: &Path,
    fresh: &Path,
    replaced: &Path,
    files: &[GeneratedFile],
    moves: &mut Vec<Move>,
) -> Result<Vec<PathBuf>, CompileError> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let target = dir.join(&file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let previous = if target.exists() {
            let aside = replaced.join(&file.path);
            if let Some(parent) = aside.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&target, &aside)?;
            Some(aside)
        } else {
            None
        };
        let moved = fs::rename(fresh.join(&file.path), &target);
        moves.push(Move { target: target.clone(), previous });
        moved?;

        info!(path = %target.display(), "wrote file");
        written.push(target);
    }
    Ok(written)
}

fn roll_back(moves: &[Move]) {
    for Move { target, previous } in moves.iter().rev() {
        let _ = fs::remove_file(target);
        if let Some(previous) = previous {
            if let Err(err) = fs::rename(previous, target) {
                warn!(path = %target.display(), %err, "could not restore file");
            }
        }
    }
}
