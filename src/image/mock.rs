use super::{ImageService, Preset};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Stand-in processor that returns canned bytes and records what it was asked.
pub struct MockImageProcessor {
    process_count: Arc<Mutex<usize>>,
    presets: Arc<Mutex<Vec<Preset>>>,
    output: Vec<u8>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageProcessor {
    pub fn new() -> Self {
        Self {
            process_count: Arc::new(Mutex::new(0)),
            presets: Arc::new(Mutex::new(Vec::new())),
            output: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_output(mut self, output: Vec<u8>) -> Self {
        self.output = output;
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_process_count(&self) -> usize {
        *self.process_count.lock().unwrap()
    }

    pub fn get_presets(&self) -> Vec<Preset> {
        self.presets.lock().unwrap().clone()
    }
}

impl Default for MockImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageService for MockImageProcessor {
    async fn compress(&self, _image_data: &[u8], preset: &Preset) -> Result<Vec<u8>> {
        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::Image(image::ImageError::IoError(
                std::io::Error::other("Mock failure"),
            )));
        }

        *self.process_count.lock().unwrap() += 1;
        self.presets.lock().unwrap().push(*preset);

        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_image_processor() {
        let processor = MockImageProcessor::new().with_output(vec![1, 2, 3]);

        let result = processor
            .compress(b"fake image data", &Preset::STORY)
            .await
            .unwrap();

        assert_eq!(result, vec![1, 2, 3]);
        assert_eq!(processor.get_process_count(), 1);
        assert_eq!(processor.get_presets(), vec![Preset::STORY]);
    }

    #[tokio::test]
    async fn test_mock_with_failure() {
        let processor = MockImageProcessor::new().with_failure(true);

        let result = processor.compress(b"data", &Preset::CHARACTER).await;
        assert!(result.is_err());
        assert_eq!(processor.get_process_count(), 0);
    }
}
