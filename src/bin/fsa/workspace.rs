//! File layout of the tool.
//!
//! Inputs are read from `<inputs>/<name>.txt`. Results are written as `<outputs>/<prefix><name>.txt`,
//! their DOT renderings as `<dots>/<prefix><name>.dot`, and, if enabled, images as `<images>/<prefix><name>.png`.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use fsa_toolkit::automata::{Automaton, CompileError, FormatError};
use log::{debug, info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Format {
        path: PathBuf,
        source: FormatError,
    },
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("graphviz failed to render {}", path.display())]
    Render { path: PathBuf },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// The directories the tool reads from and writes to.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub inputs: PathBuf,
    pub outputs: PathBuf,
    pub dots: PathBuf,
    pub images: PathBuf,
    /// Whether DOT files are also rendered to PNG with the `dot` executable.
    pub png: bool,
}

impl Workspace {
    fn text_file(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{}.txt", name))
    }

    fn read(path: &Path) -> Result<String, Error> {
        debug!("reading {}", path.display());
        fs::read_to_string(path).map_err(io_error(path))
    }

    fn write(dir: &Path, file: &str, contents: &str) -> Result<PathBuf, Error> {
        fs::create_dir_all(dir).map_err(io_error(dir))?;
        let path = dir.join(file);
        fs::write(&path, contents).map_err(io_error(&path))?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    fn parse_automaton(path: &Path) -> Result<Automaton, Error> {
        let a: Automaton = Self::read(path)?.parse().map_err(|source| Error::Format {
            path: path.to_path_buf(),
            source,
        })?;
        if let Err(e) = a.check_consistency() {
            warn!("{}: {}", path.display(), e);
        }
        Ok(a)
    }

    /// Reads the automaton `<inputs>/<name>.txt`.
    pub fn read_input(&self, name: &str) -> Result<Automaton, Error> {
        Self::parse_automaton(&Self::text_file(&self.inputs, name))
    }

    /// Reads the automaton `<outputs>/<name>.txt`, typically a result of an earlier run.
    pub fn read_output(&self, name: &str) -> Result<Automaton, Error> {
        Self::parse_automaton(&Self::text_file(&self.outputs, name))
    }

    /// Reads the regular expression on the first line of `<inputs>/<name>.txt`.
    pub fn read_regex(&self, name: &str) -> Result<String, Error> {
        let text = Self::read(&Self::text_file(&self.inputs, name))?;
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    /// Writes `<outputs>/<prefix><name>.txt`.
    pub fn write_text(&self, prefix: &str, name: &str, contents: &str) -> Result<PathBuf, Error> {
        Self::write(&self.outputs, &format!("{}{}.txt", prefix, name), contents)
    }

    /// Writes `<dots>/<prefix><name>.dot` and renders it if images are enabled.
    pub fn write_dot(&self, prefix: &str, name: &str, dot: &str) -> Result<PathBuf, Error> {
        let path = Self::write(&self.dots, &format!("{}{}.dot", prefix, name), dot)?;
        if self.png {
            self.render(&path, &format!("{}{}.png", prefix, name))?;
        }
        Ok(path)
    }

    /// Writes the automaton and its DOT rendering.
    pub fn write_automaton(&self, prefix: &str, name: &str, a: &Automaton) -> Result<PathBuf, Error> {
        let path = self.write_text(prefix, name, &a.to_string())?;
        self.write_dot(prefix, name, &Self::render_dot(a)?)?;
        Ok(path)
    }

    /// Writes only the DOT rendering of the automaton.
    pub fn draw_automaton(&self, prefix: &str, name: &str, a: &Automaton) -> Result<PathBuf, Error> {
        self.write_dot(prefix, name, &Self::render_dot(a)?)
    }

    fn render_dot(a: &Automaton) -> Result<String, Error> {
        a.dot().map_err(|source| Error::Io {
            path: PathBuf::from("<dot>"),
            source,
        })
    }

    fn render(&self, dot: &Path, file: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.images).map_err(io_error(&self.images))?;
        let png = self.images.join(file);
        let status = Command::new("dot")
            .arg("-Tpng")
            .arg(dot)
            .arg("-o")
            .arg(&png)
            .status()
            .map_err(io_error(dot))?;
        if !status.success() {
            return Err(Error::Render {
                path: dot.to_path_buf(),
            });
        }
        info!("wrote {}", png.display());
        Ok(())
    }
}
