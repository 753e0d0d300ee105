use crate::fixtures::TestFixtures;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use exifstrip::{StripRequest, StripResponse, StripService, StripperConfig};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(service: &StripService, body: serde_json::Value) -> exifstrip::Reply {
        service.handle(&serde_json::to_vec(&body).unwrap())
    }

    #[test]
    fn test_round_trip_through_json_contract() {
        let service = StripService::default();
        let input = TestFixtures::camera_jpeg();
        let reply = handle(
            &service,
            json!({ "imageBase64": STANDARD.encode(&input), "mimeType": "image/jpeg" }),
        );

        assert_eq!(reply.status, 200);
        let response: StripResponse = serde_json::from_value(reply.body).unwrap();
        assert!(response.stripped);
        assert_eq!(response.original_size, input.len());
        assert_eq!(
            response.cleaned_size,
            input.len() - TestFixtures::app1_exif().len()
        );
        assert_eq!(
            STANDARD.decode(response.image_base64).unwrap(),
            TestFixtures::camera_jpeg_clean()
        );
    }

    #[test]
    fn test_non_jpeg_mime_type_returns_original_bytes() {
        let service = StripService::default();
        let input = TestFixtures::camera_jpeg();
        let response = service
            .process(&StripRequest::new(&input, "image/webp"))
            .unwrap();
        assert!(!response.stripped);
        assert_eq!(STANDARD.decode(response.image_base64).unwrap(), input);
    }

    #[test]
    fn test_client_errors_carry_error_body() {
        let service = StripService::default();
        let cases = [
            json!({}),
            json!({ "imageBase64": "not base64 at all!", "mimeType": "image/jpeg" }),
            json!({ "imageBase64": "/9j/", "mimeType": null }),
            json!(["imageBase64"]),
        ];
        for body in cases {
            let reply = handle(&service, body);
            assert_eq!(reply.status, 400);
            assert!(!reply.is_success());
            assert!(reply.body["error"].is_string());
        }
    }

    #[test]
    fn test_configured_aliases_apply_to_requests() {
        let config = StripperConfig::from_str_any(r#"{"jpeg_media_types": ["image/jpg"]}"#).unwrap();
        let service = StripService::from_config(&config);
        let input = TestFixtures::camera_jpeg();

        assert!(service.process(&StripRequest::new(&input, "image/jpg")).unwrap().stripped);
        assert!(!service.process(&StripRequest::new(&input, "image/jpeg")).unwrap().stripped);
    }
}
