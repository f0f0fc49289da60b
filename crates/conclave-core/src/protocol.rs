use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use conclave_types::{ConclaveError, Label, RegisterRequest, Result, TaskHeader};

/// Longest accepted task header line, newline included.
pub const MAX_HEADER_BYTES: u64 = 4096;

/// Largest accepted image payload. The original deployment moved 28x28
/// digit images; anything near this cap is garbage, not a bigger model.
pub const MAX_IMAGE_BYTES: usize = 64 * 1024;

/// Longest accepted label reply.
pub const MAX_LABEL_BYTES: u64 = 1024;

/// Write one task request: JSON header, a newline, then the raw image
/// bytes, as a single logical write.
pub async fn send_task<W>(writer: &mut W, image: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let header = serde_json::to_vec(&TaskHeader::new(image.len()))
        .map_err(|e| ConclaveError::Serialization(e.to_string()))?;

    let mut frame = Vec::with_capacity(header.len() + 1 + image.len());
    frame.extend_from_slice(&header);
    frame.push(b'\n');
    frame.extend_from_slice(image);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one task request: the newline-terminated JSON header, then exactly
/// `size` image bytes.
pub async fn read_task<R>(reader: R) -> Result<(TaskHeader, Vec<u8>)>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);

    let mut line = Vec::new();
    let n = (&mut reader)
        .take(MAX_HEADER_BYTES)
        .read_until(b'\n', &mut line)
        .await?;
    if n == 0 {
        return Err(ConclaveError::MalformedFrame("empty task frame".to_string()));
    }
    if line.last() != Some(&b'\n') {
        return Err(ConclaveError::MalformedFrame(
            "task header missing newline".to_string(),
        ));
    }
    line.pop();

    let header: TaskHeader = serde_json::from_slice(&line)
        .map_err(|e| ConclaveError::Serialization(format!("bad task header: {e}")))?;
    if header.size > MAX_IMAGE_BYTES {
        return Err(ConclaveError::MalformedFrame(format!(
            "declared image size {} exceeds cap {}",
            header.size, MAX_IMAGE_BYTES
        )));
    }

    let mut image = vec![0u8; header.size];
    reader.read_exact(&mut image).await?;
    Ok((header, image))
}

/// Read the peer's reply: the label as bare UTF-8 text, terminated by the
/// peer closing its end.
pub async fn read_label<R>(reader: R) -> Result<Label>
where
    R: AsyncRead + Unpin,
{
    let mut buf = String::new();
    reader.take(MAX_LABEL_BYTES).read_to_string(&mut buf).await?;

    let label = buf.trim();
    if label.is_empty() {
        return Err(ConclaveError::MalformedFrame(
            "empty label response".to_string(),
        ));
    }
    Ok(label.to_string())
}

/// Read a registration payload: one unframed JSON object, then EOF.
/// Returns `None` for an empty connection, which is ignored silently.
pub async fn read_register<R>(reader: R, cap: u64) -> Result<Option<RegisterRequest>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.take(cap).read_to_end(&mut buf).await?;

    let text = String::from_utf8_lossy(&buf);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let request: RegisterRequest = serde_json::from_str(trimmed)
        .map_err(|e| ConclaveError::Serialization(format!("bad registration payload: {e}")))?;
    Ok(Some(request))
}
