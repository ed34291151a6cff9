//! Basic evaluation example demonstrating core functionality.
//!
//! Run with `RUST_LOG=debug` to see the per-class log events.

use voc_eval::{
    evaluate, load_from_string, metrics::iou::calculate_iou, ApMethod, BoundingBox,
    BoundingBoxes, EvaluationConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== VOC Evaluation Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let bbox1 = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
    let bbox2 = BoundingBox::new(30.0, 30.0, 70.0, 70.0);
    println!("   IoU between overlapping boxes: {:.4}", calculate_iou(&bbox1, &bbox2));
    println!();

    // Example 2: Build a collection
    println!("2. Building a Box Collection");
    let mut boxes = BoundingBoxes::new();
    boxes.add_ground_truth("000001", "person", BoundingBox::new(100.0, 100.0, 300.0, 250.0));
    boxes.add_ground_truth("000001", "car", BoundingBox::new(350.0, 200.0, 450.0, 320.0));
    boxes.add_ground_truth("000002", "person", BoundingBox::new(40.0, 60.0, 120.0, 240.0));

    boxes.add_detection("000001", "person", 0.95, BoundingBox::new(105.0, 98.0, 298.0, 255.0));
    boxes.add_detection("000001", "person", 0.60, BoundingBox::new(110.0, 105.0, 290.0, 245.0));
    boxes.add_detection("000001", "car", 0.88, BoundingBox::new(345.0, 205.0, 455.0, 318.0));
    boxes.add_detection("000002", "person", 0.72, BoundingBox::new(200.0, 60.0, 280.0, 240.0));
    println!(
        "   {} ground-truth boxes, {} detections over {} images",
        boxes.ground_truths().count(),
        boxes.detections().count(),
        boxes.image_ids().len()
    );
    println!();

    // Example 3: Evaluate with both AP methods
    println!("3. Per-class AP");
    for method in [ApMethod::EveryPoint, ApMethod::ElevenPoint] {
        let report = evaluate(&boxes, &EvaluationConfig::new(0.5, method))?;
        println!("   {}:", method.interpolator().name());
        for result in &report.classes {
            println!(
                "     {:<8} AP {:.4}  (TP {}, FP {}, positives {})",
                result.class_id, result.ap, result.total_tp, result.total_fp, result.total_positives
            );
        }
        println!("     mAP {:.4}", report.map);
    }
    println!();

    // Example 4: Configuration from JSON
    println!("4. Configuration from JSON");
    let config: EvaluationConfig =
        load_from_string(r#"{ "iou_threshold": 0.7, "method": "eleven_point" }"#)?;
    let report = evaluate(&boxes, &config)?;
    println!("   mAP at IoU {:.2}: {:.4}", report.iou_threshold, report.map);

    Ok(())
}
