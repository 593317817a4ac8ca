use std::path::Path;

use tokenizers::{Tokenizer, TruncationParams};

use super::error::ModelError;

/// Files every model directory must contain.
pub const MODEL_FILES: [&str; 3] = ["config.json", "model.safetensors", "tokenizer.json"];

/// Checks that `model_dir` is a directory holding every file in [`MODEL_FILES`].
pub fn check_model_dir(component: &'static str, model_dir: &Path) -> Result<(), ModelError> {
    if !model_dir.is_dir() {
        return Err(ModelError::DirectoryNotFound {
            component,
            path: model_dir.to_path_buf(),
        });
    }

    match MODEL_FILES
        .iter()
        .map(|name| model_dir.join(name))
        .find(|path| !path.is_file())
    {
        Some(path) => Err(ModelError::MissingFile { component, path }),
        None => Ok(()),
    }
}

/// Loads `tokenizer.json` from a model directory with truncation at `max_len` tokens.
///
/// Truncation applies to single texts and to text pairs (longest-first). The
/// cut-off tokens are kept in the encoding's overflow.
pub fn load_tokenizer(
    component: &'static str,
    model_dir: &Path,
    max_len: usize,
) -> Result<Tokenizer, ModelError> {
    let mut tokenizer = Tokenizer::from_file(model_dir.join("tokenizer.json"))
        .map_err(|e| ModelError::load_failed(component, format!("tokenizer: {e}")))?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| ModelError::load_failed(component, format!("truncation: {e}")))?;
    tokenizer.with_padding(None);

    Ok(tokenizer)
}
