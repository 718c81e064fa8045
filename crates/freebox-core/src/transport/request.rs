//! Build the multipart POST for one task and add it to the multi handle.

use curl::easy::{Easy2, Form, List};
use curl::multi::{Easy2Handle, Multi};
use url::Url;

use crate::batch::UploadTask;
use crate::config::TransferConfig;

use super::handler::UploadHandler;
use super::TransportError;

/// Multipart body: `file`, plus `custom_filename` and `description` when set.
pub(super) fn upload_form(task: &UploadTask) -> Result<Form, TransportError> {
    let mut form = Form::new();
    form.part("file")
        .file(&task.file.path)
        .filename(&task.file.name)
        .add()?;
    if let Some(ref name) = task.custom_name {
        form.part("custom_filename").contents(name.as_bytes()).add()?;
    }
    if let Some(ref description) = task.description {
        form.part("description")
            .contents(description.as_bytes())
            .add()?;
    }
    Ok(form)
}

/// Add a new Easy handle uploading `task` to `url`, configuring timeouts and
/// progress reporting. An unreadable local file is rejected here rather than
/// mid-transfer.
pub(super) fn add_upload_to_multi(
    multi: &Multi,
    url: &Url,
    task: &UploadTask,
    transfer: TransferConfig,
) -> Result<Easy2Handle<UploadHandler>, TransportError> {
    std::fs::File::open(&task.file.path)?;

    let mut easy = Easy2::new(UploadHandler::new(task.index()));
    easy.url(url.as_str())?;
    easy.connect_timeout(transfer.connect_timeout())?;
    easy.low_speed_limit(transfer.low_speed_limit)?;
    easy.low_speed_time(transfer.low_speed_time())?;
    easy.timeout(transfer.max_transfer())?;
    easy.progress(true)?;

    // Skip the 100-continue round trip; the server always reads the body.
    let mut headers = List::new();
    headers.append("Expect:")?;
    easy.http_headers(headers)?;

    easy.httppost(upload_form(task)?)?;
    Ok(multi.add2(easy)?)
}
