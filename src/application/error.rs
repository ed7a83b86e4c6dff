#[derive(Debug)]
pub enum ApplicationError {
    EmptyName,
    UnsupportedType(String),
    InvalidName(String),
    NoFilePart,
    NoFileSelected,
    NotFound,
    UploadInterrupted(String),
    BadRequest(String),
    IoError(String),
    InternalError(String),
}
