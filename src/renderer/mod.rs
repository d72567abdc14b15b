pub mod gst_media;
#[cfg(test)]
pub mod scripted_media;
