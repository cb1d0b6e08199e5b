use crate::{
    EncodeFailure, Effect, ImageShadeError, ImageShadeResult, Rgba16Image, ShadeConfig,
    is_shadow,
};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::{
    fs::{self, File, OpenOptions, Permissions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Shade `input` with `config` and write the result to `output` as an RGBA8 PNG.
///
/// The input format is detected from the file content. See [`write_png`] for
/// how the output is replaced.
pub fn shade_image_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ShadeConfig,
) -> ImageShadeResult<()> {
    let (input, output) = (input.as_ref(), output.as_ref());

    if input.as_os_str().is_empty() {
        return Err(ImageShadeError::InvalidParameter(
            "input file path is empty".to_string(),
        ));
    }

    if output.as_os_str().is_empty() {
        return Err(ImageShadeError::InvalidParameter(
            "output file path is empty".to_string(),
        ));
    }

    let source = decode_file(input)?.to_rgba16();
    log::debug!(
        "tinting with rgb({}, {}, {})",
        config.r(),
        config.g(),
        config.b()
    );

    let shaded = config.apply(&source)?;
    write_png(&shaded, output)?;

    if log::log_enabled!(log::Level::Info) {
        log::info!(
            "shaded {} ({}x{}, {} pixels tinted) into {}",
            input.display(),
            shaded.width(),
            shaded.height(),
            count_shadows(&source),
            output.display()
        );
    }

    Ok(())
}

/// Shade an already decoded image in memory.
pub fn shade_image(image: &DynamicImage, config: &ShadeConfig) -> ImageShadeResult<RgbaImage> {
    config.apply(&image.to_rgba16())
}

/// Number of pixels that qualify for re-tinting.
pub fn count_shadows(image: &Rgba16Image) -> usize {
    image.pixels().filter(|pixel| is_shadow(**pixel)).count()
}

/// Encode `image` as PNG into `output`.
///
/// A new path or an existing regular file is written through a temporary
/// sibling that only replaces the target once encoding succeeded, so a
/// failure leaves the previous content untouched. Anything else (devices,
/// pipes) is written in place and never removed.
pub fn write_png(image: &RgbaImage, output: impl AsRef<Path>) -> ImageShadeResult<()> {
    let path = output.as_ref();
    let open_error = |source| ImageShadeError::OutputOpen {
        path: path.to_path_buf(),
        source,
    };
    let encode_error = |source| ImageShadeError::Encode {
        path: path.to_path_buf(),
        source,
    };

    match OutputSink::for_path(path).map_err(open_error)? {
        OutputSink::Replace {
            target,
            permissions,
        } => {
            let dir = match target.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir,
                _ => Path::new("."),
            };

            let mut builder = tempfile::Builder::new();
            builder.prefix(".shade-").suffix(".png.tmp");
            if let Some(permissions) = permissions {
                builder.permissions(permissions);
            }

            // dropped (and deleted) on every early return below
            let temp = builder.tempfile_in(dir).map_err(open_error)?;
            encode_png(image, temp.as_file()).map_err(encode_error)?;
            temp.persist(&target)
                .map_err(|e| encode_error(EncodeFailure::Io(e.error)))?;
        }
        OutputSink::InPlace => {
            let file = OpenOptions::new()
                .write(true)
                .open(path)
                .map_err(open_error)?;

            encode_png(image, &file).map_err(|source| {
                log::warn!("{} may hold a partially written image", path.display());
                encode_error(source)
            })?;
        }
    }

    log::debug!("encoded {}", path.display());
    Ok(())
}

enum OutputSink {
    Replace {
        target: PathBuf,
        permissions: Option<Permissions>,
    },
    InPlace,
}

impl OutputSink {
    fn for_path(path: &Path) -> io::Result<Self> {
        match fs::metadata(path) {
            // follows symlinks, so a link to a regular file replaces the file it points at
            Ok(meta) if meta.is_file() => Ok(Self::Replace {
                target: fs::canonicalize(path)?,
                permissions: Some(meta.permissions()),
            }),
            Ok(_) => Ok(Self::InPlace),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::Replace {
                target: path.to_path_buf(),
                permissions: new_file_permissions(),
            }),
            Err(e) => Err(e),
        }
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

fn encode_png(image: &RgbaImage, file: &File) -> Result<(), EncodeFailure> {
    let mut writer = BufWriter::new(file);
    image.write_to(&mut writer, ImageFormat::Png)?;
    writer.flush()?;
    Ok(())
}

fn decode_file(path: &Path) -> ImageShadeResult<DynamicImage> {
    let open_error = |source| ImageShadeError::InputOpen {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::open(path)
        .map_err(open_error)?
        .with_guessed_format()
        .map_err(open_error)?;

    log::debug!("decoding {} as {:?}", path.display(), reader.format());

    reader.decode().map_err(|source| ImageShadeError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
