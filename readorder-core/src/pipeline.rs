use std::path::PathBuf;

use derive_builder::Builder;
use image::{DynamicImage, GenericImageView};
use snafu::{OptionExt, ResultExt};
use tracing::*;

use crate::{
    analysis::annotation::Annotation,
    consts::*,
    error::*,
    inference::{OrderMapper, OrderingModel, PagePrediction},
    layout::page::Page,
    ocr::{CommandOcr, OcrDocument, OcrResult, OcrRunner, crop_and_run_ocr},
    records::{
        read_annotation_row, read_boxes_csv, read_labels_csv, write_boxes_csv, write_labels_csv,
    },
    relation::{BoxIdentifier, RelationDocument, build_relations, join_labels},
    render::OrderRenderer,
    utils::write_atomic,
};

/// Settings of the annotation-to-CSV conversion.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default)]
pub struct ConvertConfig {
    /// CSV with an `annotation_bboxes` column.
    pub input_path: PathBuf,
    /// Data row to convert, 0-based.
    pub row: usize,
    /// Destination of the `x1,y1,x2,y2` CSV; skipped when unset.
    pub boxes_output: Option<PathBuf>,
    /// Destination of the `label` CSV; skipped when unset.
    pub labels_output: Option<PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_CSV),
            row: 0,
            boxes_output: Some(PathBuf::from(DEFAULT_BOXES_CSV)),
            labels_output: Some(PathBuf::from(DEFAULT_LABELS_CSV)),
        }
    }
}

/// Reads one annotation row and writes its boxes and first labels as CSV,
/// both in annotation order.
///
/// # Arguments
///
/// * `config` - Input CSV, row index and the optional output paths
///
/// # Returns
///
/// The parsed annotation, holding the valid boxes and the number of
/// skipped entries
#[tracing::instrument(skip_all, fields(input = ?config.input_path, row = config.row))]
pub fn convert(config: &ConvertConfig) -> Result<Annotation, ReadorderError> {
    let row = read_annotation_row(&config.input_path, config.row)?;
    let annotation = Annotation::parse(row.image_path, &row.annotation_bboxes)?;

    if let Some(path) = &config.boxes_output {
        write_boxes_csv(path, &annotation.bboxes())?;
        info!("Wrote {} boxes to {:?}", annotation.boxes.len(), path);
    }
    if let Some(path) = &config.labels_output {
        write_labels_csv(path, &annotation.labels())?;
        info!("Wrote {} labels to {:?}", annotation.boxes.len(), path);
    }
    if annotation.skipped > 0 {
        warn!("Skipped {} malformed annotation entries", annotation.skipped);
    }

    Ok(annotation)
}

/// Runs `model` over the boxes of `annotation` and returns their labels in
/// predicted order.
pub fn inspect_order(
    annotation: &Annotation,
    image: &DynamicImage,
    model: &mut dyn OrderingModel,
) -> Result<Vec<String>, ReadorderError> {
    let prediction = predict_single(model, image, annotation.bboxes())?;
    let order: Vec<usize> = prediction.boxes.iter().map(|ranked| ranked.index).collect();

    Ok(annotation
        .labels_in_order(&order)
        .into_iter()
        .map(str::to_string)
        .collect())
}

fn predict_single(
    model: &mut dyn OrderingModel,
    image: &DynamicImage,
    boxes: Vec<crate::analysis::bbox::Bbox>,
) -> Result<PagePrediction, ReadorderError> {
    let name = model.name().to_string();
    let mut predictions = model.predict(&[image], &[boxes])?;

    if predictions.len() != 1 {
        warn!(
            "Model `{}` returned {} predictions for one image",
            name,
            predictions.len()
        );
    }

    predictions.truncate(1);
    predictions.pop().context(ModelSnafu {
        model: name,
        message: "no prediction for the page",
    })
}

/// Turns one page prediction into ordered, identified boxes.
///
/// `width` and `height` are the pixel dimensions of the source image. When
/// `labels` is given it is joined onto the boxes by position, see
/// [`join_labels`] for the ordering precondition.
pub fn order_page<G: FnMut() -> String>(
    prediction: &PagePrediction,
    width: u32,
    height: u32,
    labels: Option<&[String]>,
    identifier: &mut BoxIdentifier<G>,
) -> Page {
    let ranked = OrderMapper::new(width, height).to_pixels(prediction);

    let joined = match labels {
        Some(labels) => join_labels(ranked.len(), labels),
        None => vec![None; ranked.len()],
    };

    Page {
        width,
        height,
        boxes: identifier.identify(&ranked, joined),
    }
}

/// Settings of one ordering run.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default, build_fn(validate = "Self::validate"))]
pub struct RelateConfig {
    /// Page image the boxes were drawn on.
    pub image_path: PathBuf,
    /// `x1,y1,x2,y2` CSV handed to the ordering model.
    pub boxes_path: PathBuf,
    /// `label` CSV joined onto the ordered boxes by position.
    pub labels_path: Option<PathBuf>,
    pub output_image_path: PathBuf,
    pub relations_path: PathBuf,
    /// Labels whose boxes share one identifier across the page.
    pub header_footer_labels: Vec<String>,
    /// Font used for rank and label text.
    pub font_path: Option<PathBuf>,
    /// Crop every box and run OCR on it.
    pub ocr: bool,
    pub ocr_languages: Vec<String>,
    /// Where recognized text is written; kept in memory only when unset.
    pub ocr_output_path: Option<PathBuf>,
    /// Repair mojibake in recognized text.
    pub auto_clean_text: bool,
}

impl Default for RelateConfig {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from(DEFAULT_IMAGE),
            boxes_path: PathBuf::from(DEFAULT_BOXES_CSV),
            labels_path: None,
            output_image_path: PathBuf::from(DEFAULT_OUTPUT_IMAGE),
            relations_path: PathBuf::from(DEFAULT_RELATIONS_JSON),
            header_footer_labels: DEFAULT_HEADER_FOOTER_LABELS
                .iter()
                .map(|label| label.to_string())
                .collect(),
            font_path: None,
            ocr: false,
            ocr_languages: DEFAULT_OCR_LANGUAGES
                .iter()
                .map(|lang| lang.to_string())
                .collect(),
            ocr_output_path: None,
            auto_clean_text: true,
        }
    }
}

impl RelateConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.ocr == Some(true) && self.ocr_languages.as_ref().is_some_and(Vec::is_empty) {
            return Err("OCR needs at least one language".to_string());
        }
        if let (Some(image), Some(relations)) = (&self.output_image_path, &self.relations_path) {
            if image == relations {
                return Err(format!(
                    "output image and relations share the path {:?}",
                    image
                ));
            }
        }
        Ok(())
    }
}

impl From<RelateConfigBuilderError> for ReadorderError {
    fn from(err: RelateConfigBuilderError) -> Self {
        ReadorderError::Config {
            message: err.to_string(),
        }
    }
}

impl From<ConvertConfigBuilderError> for ReadorderError {
    fn from(err: ConvertConfigBuilderError) -> Self {
        ReadorderError::Config {
            message: err.to_string(),
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RelateOutcome {
    pub page: Page,
    pub relations: RelationDocument,
    pub ocr: Vec<OcrResult>,
}

/// Orders the boxes of one page image and writes the annotated image, the
/// relation graph and, optionally, the OCR text of every box.
pub struct RelatePipeline {
    config: RelateConfig,
    model: Box<dyn OrderingModel>,
    ocr: Option<Box<dyn OcrRunner>>,
}

impl RelatePipeline {
    pub fn new(config: RelateConfig, model: Box<dyn OrderingModel>) -> Self {
        Self {
            config,
            model,
            ocr: None,
        }
    }

    /// Replaces the OCR runner. Without one, OCR runs the command named by
    /// the environment, see [`CommandOcr::from_env`].
    pub fn with_ocr(mut self, runner: Box<dyn OcrRunner>) -> Self {
        self.ocr = Some(runner);
        self
    }

    pub fn config(&self) -> &RelateConfig {
        &self.config
    }

    /// Runs every step for the configured page image.
    ///
    /// Outputs are written only once ordering succeeded, each one atomically.
    /// OCR runs after the image and relations are saved, so an OCR failure
    /// leaves those two in place.
    ///
    /// # Returns
    ///
    /// The ordered page, its relation document and the OCR results (empty
    /// when OCR is off)
    ///
    /// # Errors
    ///
    /// Any unreadable input, a model failure, a failed write or OCR failure
    #[tracing::instrument(
        skip_all,
        fields(image = ?self.config.image_path, model = self.model.name())
    )]
    pub fn run(&mut self) -> Result<RelateOutcome, ReadorderError> {
        let config = &self.config;

        let font = config
            .font_path
            .as_ref()
            .map(OrderRenderer::load_font)
            .transpose()?;
        let renderer = OrderRenderer::new(font);

        let image = image::open(&config.image_path).context(ImageReadSnafu {
            path: config.image_path.to_string_lossy(),
        })?;
        let (width, height) = image.dimensions();
        info!("Image dimensions: {}x{}", width, height);

        let boxes = read_boxes_csv(&config.boxes_path)?;
        let labels = config
            .labels_path
            .as_ref()
            .map(read_labels_csv)
            .transpose()?;

        let prediction = predict_single(self.model.as_mut(), &image, boxes)?;
        debug!("Model returned {} ordered boxes", prediction.boxes.len());

        let mut identifier = BoxIdentifier::new(&config.header_footer_labels);
        let page = order_page(
            &prediction,
            width,
            height,
            labels.as_deref(),
            &mut identifier,
        );
        let relations = build_relations(&page.boxes);

        renderer.save(&image, &page, &config.output_image_path)?;

        write_atomic(&config.relations_path, |writer| {
            serde_json::to_writer_pretty(writer, &relations).context(JsonSnafu {
                stage: "relations",
            })
        })?;
        info!(
            "Relations JSON saved to {:?} ({} relations)",
            config.relations_path,
            relations.bboxes_relation_json.len()
        );

        let ocr = if config.ocr {
            let runner = self
                .ocr
                .get_or_insert_with(|| Box::new(CommandOcr::from_env()));
            let results = crop_and_run_ocr(
                &image,
                &page,
                runner.as_mut(),
                &config.ocr_languages,
                config.auto_clean_text,
            )?;

            if let Some(path) = &config.ocr_output_path {
                let document = OcrDocument {
                    ocr: results.clone(),
                };
                write_atomic(path, |writer| {
                    serde_json::to_writer_pretty(writer, &document)
                        .context(JsonSnafu { stage: "ocr" })
                })?;
                info!("OCR JSON saved to {:?}", path);
            }

            results
        } else {
            Vec::new()
        };

        Ok(RelateOutcome {
            page,
            relations,
            ocr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use glam::DVec2;

    use super::*;
    use crate::{analysis::bbox::Bbox, inference::RankedBox};

    const SCENARIO: &str = r#"[
        {"x": 0, "y": 0, "width": 10, "height": 10, "labels": ["header"]},
        {"x": 0, "y": 20, "width": 10, "height": 10, "labels": ["body"]},
        {"x": 0, "y": 40, "width": 10, "height": 10, "labels": ["header"]}
    ]"#;

    /// Returns the boxes in input order, normalized to the image.
    struct InputOrder;

    impl OrderingModel for InputOrder {
        fn name(&self) -> &str {
            "input-order"
        }

        fn predict(
            &mut self,
            images: &[&DynamicImage],
            boxes: &[Vec<Bbox>],
        ) -> Result<Vec<PagePrediction>, ReadorderError> {
            Ok(images
                .iter()
                .zip(boxes)
                .map(|(image, page)| {
                    let (width, height) = image.dimensions();
                    let factor = DVec2::new(100.0 / width as f64, 100.0 / height as f64);
                    PagePrediction {
                        boxes: page
                            .iter()
                            .enumerate()
                            .map(|(idx, bbox)| RankedBox {
                                index: idx,
                                rank: idx,
                                bbox: bbox.scale(factor),
                            })
                            .collect(),
                    }
                })
                .collect())
        }
    }

    /// Reverses the input order.
    struct Reversed;

    impl OrderingModel for Reversed {
        fn name(&self) -> &str {
            "reversed"
        }

        fn predict(
            &mut self,
            images: &[&DynamicImage],
            boxes: &[Vec<Bbox>],
        ) -> Result<Vec<PagePrediction>, ReadorderError> {
            let mut predictions = InputOrder.predict(images, boxes)?;
            for prediction in &mut predictions {
                prediction.boxes.reverse();
                for (rank, ranked) in prediction.boxes.iter_mut().enumerate() {
                    ranked.rank = rank;
                }
            }
            Ok(predictions)
        }
    }

    struct Broken;

    impl OrderingModel for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn predict(
            &mut self,
            _images: &[&DynamicImage],
            _boxes: &[Vec<Bbox>],
        ) -> Result<Vec<PagePrediction>, ReadorderError> {
            ModelSnafu {
                model: "broken",
                message: "weights missing",
            }
            .fail()
        }
    }

    struct EchoOcr;

    impl OcrRunner for EchoOcr {
        fn run(
            &mut self,
            image_path: &Path,
            languages: &[String],
        ) -> Result<String, ReadorderError> {
            let crop = image::open(image_path).unwrap();
            Ok(format!(
                "{}x{} {}",
                crop.width(),
                crop.height(),
                languages.join(",")
            ))
        }
    }

    fn write_input_csv(dir: &Path, image_path: &str, annotation: &str) -> PathBuf {
        let path = dir.join("input.csv");
        let mut writer = csv::Writer::from_path(&path).unwrap();
        writer
            .write_record(["image_path", "annotation_bboxes"])
            .unwrap();
        writer.write_record([image_path, annotation]).unwrap();
        writer.flush().unwrap();
        path
    }

    fn write_page_image(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("page.png");
        DynamicImage::new_rgb8(width, height).save(&path).unwrap();
        path
    }

    fn counter() -> impl FnMut() -> String {
        let mut next = 0;
        move || {
            next += 1;
            format!("{:08x}", next)
        }
    }

    #[test]
    fn test_order_page_header_scenario() {
        let annotation = Annotation::parse(None, SCENARIO).unwrap();
        let image = DynamicImage::new_rgb8(100, 100);
        let prediction = predict_single(&mut InputOrder, &image, annotation.bboxes()).unwrap();

        let labels = annotation.labels();
        let mut identifier = BoxIdentifier::new(["header"]);
        let page = order_page(&prediction, 100, 100, Some(labels.as_slice()), &mut identifier);

        assert_eq!(page.boxes.len(), 3);
        assert_eq!(page.boxes[0].id, page.boxes[2].id);
        assert_ne!(page.boxes[0].id, page.boxes[1].id);
        for (ordered, labeled) in page.boxes.iter().zip(&annotation.boxes) {
            assert_eq!(ordered.bbox, labeled.bbox);
        }

        let relations = build_relations(&page.boxes).bboxes_relation_json;
        assert_eq!(relations.len(), 2);

        let shared = &page.boxes[0].id;
        let body = &page.boxes[1].id;
        // header -> body, body -> header: the shared id shows up on both ends
        assert_eq!(&relations[0].from_id, shared);
        assert_eq!(&relations[0].to_id, body);
        assert_eq!(&relations[1].from_id, body);
        assert_eq!(&relations[1].to_id, shared);
        assert_eq!(relations[0].from_id, relations[1].to_id);
        assert_ne!(relations[0].from_id, relations[1].from_id);
    }

    #[test]
    fn test_order_page_without_labels() {
        let annotation = Annotation::parse(None, SCENARIO).unwrap();
        let image = DynamicImage::new_rgb8(100, 100);
        let prediction = predict_single(&mut InputOrder, &image, annotation.bboxes()).unwrap();

        let mut identifier = BoxIdentifier::with_generator(["header"], counter());
        let page = order_page(&prediction, 100, 100, None, &mut identifier);

        assert_eq!(page.ids(), vec!["00000001", "00000002", "00000003"]);
        assert!(page.boxes.iter().all(|ordered| ordered.label.is_none()));
    }

    #[test]
    fn test_order_page_scales_to_pixels() {
        let prediction = PagePrediction {
            boxes: vec![RankedBox {
                index: 0,
                rank: 0,
                bbox: Bbox::from_corners(10.0, 10.0, 20.0, 20.0),
            }],
        };

        let mut identifier = BoxIdentifier::new(Vec::<String>::new());
        let page = order_page(&prediction, 1000, 2000, None, &mut identifier);

        assert_eq!((page.width, page.height), (1000, 2000));
        assert_eq!(page.boxes[0].bbox.corners(), [100.0, 200.0, 200.0, 400.0]);
    }

    #[test]
    fn test_order_page_drops_inverted_model_boxes() {
        let prediction = PagePrediction {
            boxes: vec![
                RankedBox {
                    index: 0,
                    rank: 0,
                    bbox: Bbox::from_corners(0.0, 0.0, 10.0, 10.0),
                },
                RankedBox {
                    index: 1,
                    rank: 1,
                    bbox: Bbox::from_corners(20.0, 20.0, 10.0, 10.0),
                },
                RankedBox {
                    index: 2,
                    rank: 2,
                    bbox: Bbox::from_corners(0.0, 40.0, 10.0, 50.0),
                },
            ],
        };

        let labels = vec!["header".to_string(), "body".to_string()];
        let mut identifier = BoxIdentifier::with_generator(["header"], counter());
        let page = order_page(&prediction, 100, 100, Some(labels.as_slice()), &mut identifier);

        assert_eq!(page.boxes.len(), 2);
        assert!(page.boxes.iter().all(|ordered| ordered.bbox.validate().is_ok()));
        let ranks: Vec<usize> = page.boxes.iter().map(|ordered| ordered.rank).collect();
        assert_eq!(ranks, vec![0, 2]);
        assert_eq!(build_relations(&page.boxes).bboxes_relation_json.len(), 1);
    }

    #[test]
    fn test_order_page_joins_labels_by_position() {
        // The join follows predicted order, not annotation order
        let annotation = Annotation::parse(None, SCENARIO).unwrap();
        let image = DynamicImage::new_rgb8(100, 100);
        let prediction = predict_single(&mut Reversed, &image, annotation.bboxes()).unwrap();

        let labels = vec!["a".to_string(), "b".to_string()];
        let mut identifier = BoxIdentifier::with_generator(["a"], counter());
        let page = order_page(&prediction, 100, 100, Some(labels.as_slice()), &mut identifier);

        let joined: Vec<_> = page
            .boxes
            .iter()
            .map(|ordered| ordered.label.as_deref().unwrap())
            .collect();
        assert_eq!(joined, vec!["a", "b", "a"]);
        assert_eq!(page.boxes[0].bbox, annotation.boxes[2].bbox);
        assert_eq!(page.ids(), vec!["00000001", "00000002", "00000001"]);
    }

    #[test]
    fn test_inspect_order() {
        let annotation = Annotation::parse(None, SCENARIO).unwrap();
        let image = DynamicImage::new_rgb8(100, 100);

        let labels = inspect_order(&annotation, &image, &mut Reversed).unwrap();
        assert_eq!(labels, vec!["header", "body", "header"]);

        let labels = inspect_order(&annotation, &image, &mut InputOrder).unwrap();
        assert_eq!(labels, vec!["header", "body", "header"]);
    }

    #[test]
    fn test_convert_writes_both_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input_csv(dir.path(), "page.png", SCENARIO);

        let config = ConvertConfigBuilder::default()
            .input_path(input)
            .boxes_output(dir.path().join("boxes.csv"))
            .labels_output(dir.path().join("labels.csv"))
            .build()
            .unwrap();
        let annotation = convert(&config).unwrap();

        assert_eq!(annotation.image_path.as_deref(), Some("page.png"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("boxes.csv")).unwrap(),
            "x1,y1,x2,y2\n0,0,10,10\n0,20,10,30\n0,40,10,50\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("labels.csv")).unwrap(),
            "label\nheader\nbody\nheader\n"
        );
    }

    #[test]
    fn test_convert_skips_malformed_and_optional_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input_csv(
            dir.path(),
            "",
            r#"[{"x": 1, "y": 2, "width": 3, "height": 4, "labels": ["a"]}, {"x": 1}]"#,
        );

        let config = ConvertConfigBuilder::default()
            .input_path(input)
            .boxes_output(dir.path().join("boxes.csv"))
            .labels_output(None)
            .build()
            .unwrap();
        let annotation = convert(&config).unwrap();

        assert_eq!(annotation.boxes.len(), 1);
        assert_eq!(annotation.skipped, 1);
        assert!(dir.path().join("boxes.csv").exists());
        assert!(!dir.path().join("labels.csv").exists());
    }

    #[test]
    fn test_relate_config_validation() {
        assert!(RelateConfigBuilder::default().build().is_ok());

        let no_languages: ReadorderError = RelateConfigBuilder::default()
            .ocr(true)
            .ocr_languages(Vec::<String>::new())
            .build()
            .unwrap_err()
            .into();
        assert!(matches!(no_languages, ReadorderError::Config { .. }));
        assert!(no_languages.to_string().contains("language"));

        let same_output = RelateConfigBuilder::default()
            .output_image_path("out.png")
            .relations_path("out.png")
            .build();
        assert!(same_output.is_err());
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_page_image(dir.path(), 100, 100);
        let input = write_input_csv(dir.path(), "page.png", SCENARIO);

        let convert_config = ConvertConfigBuilder::default()
            .input_path(input)
            .boxes_output(dir.path().join("boxes.csv"))
            .labels_output(dir.path().join("labels.csv"))
            .build()
            .unwrap();
        convert(&convert_config).unwrap();

        let config = RelateConfigBuilder::default()
            .image_path(image_path)
            .boxes_path(dir.path().join("boxes.csv"))
            .labels_path(dir.path().join("labels.csv"))
            .output_image_path(dir.path().join("ordered.png"))
            .relations_path(dir.path().join("relations.json"))
            .header_footer_labels(vec!["header".to_string(), "footer".to_string()])
            .ocr(true)
            .ocr_output_path(dir.path().join("ocr.json"))
            .build()
            .unwrap();

        let mut pipeline =
            RelatePipeline::new(config, Box::new(InputOrder)).with_ocr(Box::new(EchoOcr));
        let outcome = pipeline.run().unwrap();

        assert_eq!(outcome.page.boxes.len(), 3);
        assert_eq!(outcome.page.boxes[0].id, outcome.page.boxes[2].id);

        let written: RelationDocument = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("relations.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written, outcome.relations);
        assert_eq!(written.bboxes_relation_json.len(), 2);
        assert_eq!(
            written.bboxes_relation_json[0].from_id,
            written.bboxes_relation_json[1].to_id
        );

        let ordered = image::open(dir.path().join("ordered.png")).unwrap();
        assert_eq!(ordered.dimensions(), (100, 100));

        assert_eq!(outcome.ocr.len(), 3);
        assert_eq!(outcome.ocr[1].text, "10x10 hi,en");
        let ocr: OcrDocument = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("ocr.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(ocr.ocr, outcome.ocr);
    }

    #[test]
    fn test_pipeline_relations_json_is_indented() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_page_image(dir.path(), 100, 100);
        std::fs::write(dir.path().join("boxes.csv"), "x1,y1,x2,y2\n0,0,10,10\n0,20,10,30\n")
            .unwrap();

        let config = RelateConfigBuilder::default()
            .image_path(image_path)
            .boxes_path(dir.path().join("boxes.csv"))
            .output_image_path(dir.path().join("ordered.png"))
            .relations_path(dir.path().join("relations.json"))
            .build()
            .unwrap();
        RelatePipeline::new(config, Box::new(InputOrder)).run().unwrap();

        let text = std::fs::read_to_string(dir.path().join("relations.json")).unwrap();
        let expected_head =
            "{\n  \"bboxes_relation_json\": [\n    {\n      \"type\": \"relation\",";
        assert!(text.starts_with(expected_head));
    }

    #[test]
    fn test_pipeline_model_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_page_image(dir.path(), 50, 50);
        std::fs::write(dir.path().join("boxes.csv"), "x1,y1,x2,y2\n0,0,10,10\n").unwrap();

        let config = RelateConfigBuilder::default()
            .image_path(image_path)
            .boxes_path(dir.path().join("boxes.csv"))
            .output_image_path(dir.path().join("ordered.png"))
            .relations_path(dir.path().join("relations.json"))
            .build()
            .unwrap();
        let result = RelatePipeline::new(config, Box::new(Broken)).run();

        assert!(matches!(result, Err(ReadorderError::Model { .. })));
        assert!(!dir.path().join("ordered.png").exists());
        assert!(!dir.path().join("relations.json").exists());
    }

    #[test]
    fn test_pipeline_missing_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = RelateConfigBuilder::default()
            .image_path(dir.path().join("absent.png"))
            .boxes_path(dir.path().join("boxes.csv"))
            .relations_path(dir.path().join("relations.json"))
            .build()
            .unwrap();

        let result = RelatePipeline::new(config, Box::new(InputOrder)).run();
        assert!(matches!(result, Err(ReadorderError::ImageRead { .. })));
    }
}
