use std::sync::Arc;

use axum::body::Bytes;
use serde::Serialize;

use crate::{
    classifier::Classifier,
    error::{Error, Result},
    labels::LabelMap,
    normalize::normalize,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: String,
    pub confidence: f32,
}

/// Runs one uploaded image through normalization, the classifier and the
/// label map. Holds only read-only state, so clones share the same model.
#[derive(Clone)]
pub struct PredictionService {
    classifier: Arc<dyn Classifier>,
    labels: Arc<LabelMap>,
}

impl PredictionService {
    pub fn new(classifier: Arc<dyn Classifier>, labels: LabelMap) -> Self {
        Self {
            classifier,
            labels: Arc::new(labels),
        }
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// Validate that an image was uploaded, then classify it.
    pub fn handle(&self, image: Option<Bytes>) -> Result<PredictionResult> {
        let image = image.ok_or(Error::MissingImage)?;
        self.predict(&image)
    }

    pub fn predict(&self, image_data: &[u8]) -> Result<PredictionResult> {
        let tensor = normalize(image_data)?;
        let scores = self.classifier.classify(&tensor)?;

        if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
            return Err(Error::inference(format!(
                "classifier returned a non-finite score {} at index {index}",
                scores[index]
            )));
        }

        let (index, confidence) = top_class(&scores)
            .ok_or_else(|| Error::inference("classifier returned an empty probability vector"))?;

        let prediction = self.labels.label_or_unknown(index).to_string();
        tracing::debug!(index, %prediction, confidence, "classified image");

        Ok(PredictionResult {
            prediction,
            confidence,
        })
    }
}

/// Index and value of the highest score. The first index wins on ties.
/// Scores are expected to be finite; a NaN never wins.
pub fn top_class(scores: &[f32]) -> Option<(usize, f32)> {
    let (&first, rest) = scores.split_first()?;
    let mut best = (0, first);
    for (i, &score) in rest.iter().enumerate() {
        if score > best.1 {
            best = (i + 1, score);
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use std::{
        io::Cursor,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};

    use super::*;
    use crate::normalize::{ImageTensor, TENSOR_SHAPE};

    fn png() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 10, Luma([200])))
            .write_to(&mut buf, ImageOutputFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn service_returning(scores: Vec<f32>) -> PredictionService {
        let classifier = move |input: &ImageTensor| -> Result<Vec<f32>> {
            assert_eq!(input.shape(), &TENSOR_SHAPE);
            Ok(scores.clone())
        };
        PredictionService::new(Arc::new(classifier), LabelMap::default())
    }

    #[test]
    fn top_class_picks_the_maximum() {
        assert_eq!(top_class(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
        assert_eq!(top_class(&[0.05, 0.05, 0.9]), Some((2, 0.9)));
        assert_eq!(top_class(&[1.0]), Some((0, 1.0)));
        assert_eq!(top_class(&[]), None);
    }

    #[test]
    fn top_class_ties_go_to_lowest_index() {
        assert_eq!(top_class(&[0.2, 0.4, 0.4]), Some((1, 0.4)));
        assert_eq!(top_class(&[0.5, 0.5, 0.0]), Some((0, 0.5)));
    }

    #[test]
    fn prediction_uses_label_and_max_score() {
        let service = service_returning(vec![0.1, 0.2, 0.7]);
        let result = service.predict(&png()).unwrap();
        assert_eq!(
            result,
            PredictionResult {
                prediction: "Ular".into(),
                confidence: 0.7
            }
        );
    }

    #[test]
    fn unknown_index_degrades_to_fallback_label() {
        let service = service_returning(vec![0.1, 0.1, 0.1, 0.7]);
        let result = service.predict(&png()).unwrap();
        assert_eq!(result.prediction, crate::labels::UNKNOWN_LABEL);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn empty_scores_are_an_inference_error() {
        let service = service_returning(vec![]);
        assert!(matches!(
            service.predict(&png()),
            Err(Error::Inference { .. })
        ));
    }

    #[test]
    fn missing_image_never_reaches_classifier() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let classifier = move |_: &ImageTensor| -> Result<Vec<f32>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 0.0, 0.0])
        };
        let service = PredictionService::new(Arc::new(classifier), LabelMap::default());

        assert!(matches!(service.handle(None), Err(Error::MissingImage)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let bad = service.handle(Some(Bytes::from_static(b"garbage")));
        assert!(matches!(bad, Err(Error::Decode(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let ok = service.handle(Some(Bytes::from(png()))).unwrap();
        assert_eq!(ok.prediction, "Kucing");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_finite_scores_are_an_inference_error() {
        for scores in [
            vec![f32::NAN, 0.2, 0.7],
            vec![0.1, f32::NAN, 0.7],
            vec![f32::INFINITY, 0.2, 0.7],
            vec![0.3, 0.2, f32::NEG_INFINITY],
        ] {
            let service = service_returning(scores.clone());
            let err = service.predict(&png()).unwrap_err();
            assert!(
                matches!(err, Error::Inference { .. }),
                "{scores:?} gave {err}"
            );
            assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn classifier_errors_propagate() {
        let classifier =
            |_: &ImageTensor| -> Result<Vec<f32>> { Err(Error::inference("graph exploded")) };
        let service = PredictionService::new(Arc::new(classifier), LabelMap::default());

        let err = service.predict(&png()).unwrap_err();
        assert_eq!(err.to_string(), "model inference failed: graph exploded");
    }
}
