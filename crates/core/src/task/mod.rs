mod error;
mod object_id;
mod operations;
mod requests;
mod types;

pub use error::TaskError;
pub use object_id::{ObjectId, ObjectIdError, OBJECT_ID_LEN};
pub use operations::{apply_patch, validate_new_task, validate_patch};
pub use requests::{NewTask, TaskPatch};
pub use types::Task;
