//! gRPC `DistributorService` implementation

use futures_core::Stream;
use std::pin::Pin;
use tokio::sync::mpsc;
use tonic::{Request, Response, Status};

use distributor_proto::distributor::v1 as pb;
use distributor_proto::distributor::v1::distributor_service_server::{
	DistributorService, DistributorServiceServer,
};

use crate::prelude::*;
use crate::stream::StreamAdapter;
use crate::validate::{RequestValidator, StreamRequest};

impl From<pb::NotificationStreamRequest> for StreamRequest {
	fn from(req: pb::NotificationStreamRequest) -> Self {
		Self {
			org_id: req.org_id,
			network_id: req.network_id,
			subscriber_id: req.subscriber_id,
			user_id: req.user_id,
			scopes: req.scopes,
		}
	}
}

pub type NotificationStream = Pin<Box<dyn Stream<Item = Result<pb::Notification, Status>> + Send>>;

#[derive(Debug, Clone)]
pub struct DistributorServer {
	validator: RequestValidator,
	adapter: StreamAdapter,
	stream_buffer: usize,
}

impl DistributorServer {
	pub fn new(validator: RequestValidator, adapter: StreamAdapter, stream_buffer: usize) -> Self {
		Self { validator, adapter, stream_buffer: stream_buffer.max(1) }
	}

	pub fn into_service(self) -> DistributorServiceServer<Self> {
		DistributorServiceServer::new(self)
	}
}

#[tonic::async_trait]
impl DistributorService for DistributorServer {
	type GetNotificationStreamStream = NotificationStream;

	async fn get_notification_stream(
		&self,
		request: Request<pb::NotificationStreamRequest>,
	) -> Result<Response<Self::GetNotificationStreamStream>, Status> {
		let req = StreamRequest::from(request.into_inner());
		let registration = self.validator.validate(&req).await.map_err(|err| {
			info!(org_id = %req.org_id, user_id = %req.user_id, subscriber_id = %req.subscriber_id, error = %err, "notification stream rejected");
			Status::from(err)
		})?;

		let (tx, mut rx) = mpsc::channel::<Result<pb::Notification, Status>>(self.stream_buffer);
		let adapter = self.adapter.clone();
		tokio::spawn(async move {
			adapter.serve(&registration, tx).await;
		});

		let stream = async_stream::stream! {
			while let Some(item) = rx.recv().await {
				yield item;
			}
		};

		Ok(Response::new(Box::pin(stream)))
	}
}

// vim: ts=4
