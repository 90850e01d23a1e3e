pub mod body {
    use crate::types::{HttpRequest, HttpResponse};
    use http_body_util::BodyExt;

    pub async fn read_text(req: &HttpRequest) -> anyhow::Result<String> {
        let bytes = req.body().clone().collect().await?.to_bytes();
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub async fn response_text(res: HttpResponse) -> anyhow::Result<String> {
        let bytes = res.into_body().collect().await?.to_bytes();
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}
