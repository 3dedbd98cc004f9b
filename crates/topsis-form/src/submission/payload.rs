use reqwest::multipart::{Form, Part};

use crate::form::{FormInput, MailDelivery, UploadFile};

/// The multipart body of one scoring request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub file: UploadFile,
    pub weights: String,
    pub impacts: String,
    pub email: Option<String>,
    pub send_mail: bool,
}

impl From<FormInput> for SubmissionPayload {
    fn from(input: FormInput) -> Self {
        let FormInput {
            file,
            weights,
            impacts,
            delivery,
        } = input;

        let send_mail = delivery.send_mail();
        let email = match delivery {
            MailDelivery::NoEmail => None,
            MailDelivery::WithEmail(address) => Some(address.to_string()),
        };

        Self {
            file,
            weights,
            impacts,
            email,
            send_mail,
        }
    }
}

impl SubmissionPayload {
    /// Text parts in wire order; `email` only appears when mail was requested.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("weights", self.weights.clone()),
            ("impacts", self.impacts.clone()),
        ];
        if let Some(email) = &self.email {
            fields.push(("email", email.clone()));
        }
        fields.push(("send_mail", self.send_mail.to_string()));
        fields
    }

    pub fn into_multipart(self) -> Result<Form, reqwest::Error> {
        let text_fields = self.text_fields();
        let UploadFile {
            file_name,
            content_type,
            bytes,
        } = self.file;

        // An unparseable client-supplied type is sent as CSV rather than failing the request.
        let content_type = content_type
            .parse::<mime::Mime>()
            .unwrap_or(mime::TEXT_CSV);
        let file_part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type.as_ref())?;

        Ok(text_fields
            .into_iter()
            .fold(Form::new().part("file", file_part), |form, (name, value)| {
                form.text(name, value)
            }))
    }
}
